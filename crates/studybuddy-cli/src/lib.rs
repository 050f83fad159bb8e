use studybuddy_core::Schedule;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plain-text table of a schedule: one row per due item, or per week when it has none.
pub fn render_schedule_table(schedule: &Schedule) -> String {
    let mut out = format!(
        "{:<12} {:<32} {:<28} {:<12}\n",
        "WEEK", "TOPIC", "DUE", "DATE"
    );
    out.push_str(&"-".repeat(87));
    out.push('\n');

    for entry in schedule.iter() {
        let week = truncate_string(&entry.week, 12);
        let topic = truncate_string(&entry.topic, 32);
        if entry.due_items.is_empty() {
            out.push_str(&format!("{:<12} {:<32} {:<28} {:<12}\n", week, topic, "-", "-"));
            continue;
        }
        for item in &entry.due_items {
            out.push_str(&format!(
                "{:<12} {:<32} {:<28} {:<12}\n",
                week,
                topic,
                truncate_string(&item.title, 28),
                truncate_string(&item.due_date, 12)
            ));
        }
    }

    out.push_str(&format!(
        "\n{} weeks, {} due items\n",
        schedule.len(),
        schedule.due_item_count()
    ));
    out
}

/// Initialize tracing for the CLI; quiet unless RUST_LOG says otherwise.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybuddy_core::parse_schedule;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("Week 1", 12), "Week 1");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("Introduction to Algorithms", 10), "Introdu...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn truncate_string_counts_chars() {
        assert_eq!(truncate_string("Semana único", 12), "Semana único");
    }

    #[test]
    fn schedule_table_lists_every_due_item() {
        let schedule = parse_schedule(
            r#"[
                {"week":"Week 1","topic":"Intro","due_items":[{"title":"HW1","due_date":"2024-09-01"}]},
                {"week":"Week 2","topic":"Sorting","due_items":[]}
            ]"#,
        )
        .unwrap();

        let table = render_schedule_table(&schedule);
        let rows: Vec<&str> = table.lines().collect();
        assert!(rows[2].starts_with("Week 1"));
        assert!(rows[2].contains("HW1"));
        assert!(rows[2].contains("2024-09-01"));
        assert!(rows[3].starts_with("Week 2"));
        assert!(table.ends_with("2 weeks, 1 due items\n"));
    }
}
