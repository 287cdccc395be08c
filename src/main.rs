use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use refdash::aggregate::{Dashboard, GroupKey, HourCounts, table_rows};
use refdash::config::Settings;
use refdash::export;
use refdash::filter::{FilterState, referee_options};
use refdash::{Dataset, persist, source, synthetic};

const DEMO_MATCHES: usize = 600;
const DEMO_SEED: u64 = 2024;
const TABLE_PREVIEW: usize = 20;
const TOP_PREVIEW: usize = 5;

fn main() -> Result<()> {
    let settings = Settings::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let persist_filters = settings.persist_filters && !has_flag(&args, "--no-persist");

    let dataset = if has_flag(&args, "--demo") {
        synthetic::generate(DEMO_MATCHES, DEMO_SEED)
    } else {
        let location = arg_value(&args, "--data").unwrap_or(settings.data_location.clone());
        source::load_dataset(&location, settings.http_timeout_secs)?
    };

    let mut remembered = if persist_filters {
        persist::load_filter_state()
    } else {
        FilterState::default()
    };
    if has_flag(&args, "--clear") {
        remembered = remembered.cleared();
    }
    let state = apply_args(remembered, &args)?;
    if persist_filters && let Err(err) = persist::save_filter_state(&state) {
        log::warn!("could not remember filters: {err:#}");
    }

    let view = Dashboard::evaluate(&dataset, &state);
    print_report(&dataset, &state, &view);

    if let Some(raw) = arg_value(&args, "--group") {
        let key = GroupKey::parse(&raw).ok_or_else(|| anyhow!("unknown group key `{raw}`"))?;
        println!();
        println!("Matches by {key:?}");
        for (label, count) in view.group_by(key) {
            println!("  {label:<32} {count:>5}");
        }
    }

    let rows = view.export_rows();
    if let Some(path) = arg_value(&args, "--csv") {
        let path = PathBuf::from(path);
        if export::write_csv(&path, &rows)? {
            println!("CSV written: {}", path.display());
        } else {
            println!("CSV skipped: no matches in view");
        }
    }
    if let Some(path) = arg_value(&args, "--xlsx") {
        let path = PathBuf::from(path);
        if export::write_xlsx(&path, &rows)? {
            println!("Workbook written: {}", path.display());
        } else {
            println!("Workbook skipped: no matches in view");
        }
    }

    Ok(())
}

fn apply_args(mut state: FilterState, args: &[String]) -> Result<FilterState> {
    if let Some(name) = arg_value(args, "--referee") {
        state = state.with_referee(Some(&name));
    }
    if let Some(raw) = arg_value(args, "--compare") {
        state = state.with_compare(split_list(&raw));
    }
    if let Some(raw) = arg_value(args, "--series") {
        state = state.with_series(split_list(&raw));
    }
    if let Some(raw) = arg_value(args, "--arena") {
        state = state.with_arenas(split_list(&raw));
    }
    let from = arg_value(args, "--from");
    let to = arg_value(args, "--to");
    if from.is_some() || to.is_some() {
        let mut range = state.date_range;
        if let Some(raw) = from {
            range.from = parse_date_arg("--from", &raw)?;
        }
        if let Some(raw) = to {
            range.to = parse_date_arg("--to", &raw)?;
        }
        state = state.with_date_range(range);
    }
    if let Some(partner) = arg_value(args, "--partner") {
        if state.selected_referee().is_none() {
            log::warn!("partner focus `{partner}` ignored without --referee");
        } else {
            state = state.toggle_partner_focus(&partner);
        }
    }
    Ok(state)
}

fn print_report(dataset: &Dataset, state: &FilterState, view: &Dashboard<'_>) {
    let summary = &view.summary;
    println!(
        "Period: {} -> {}",
        summary.date_min.as_deref().unwrap_or("?"),
        summary.date_max.as_deref().unwrap_or("?")
    );
    println!("Matches in view: {}", summary.matches_in_view);
    match (&summary.selected_referee, summary.selected_total) {
        (Some(name), Some(total)) => println!("Referee: {name} ({total} matches total)"),
        _ => println!("Referee: -"),
    }
    println!(
        "Series filters: {}  Arena filters: {}",
        count_or_dash(summary.series_filters),
        count_or_dash(summary.arena_filters)
    );
    if let Some(partner) = state.active_partner() {
        println!("Partner focus: {partner}");
    }

    if let Some(profile) = &view.profile {
        println!();
        println!("Top partners");
        for p in profile.top_partners.iter().take(TOP_PREVIEW) {
            println!("  {:<32} {:>5}", p.coreferee, p.together_matches);
        }
        println!("Series distribution");
        for (series, count) in &profile.series_distribution {
            println!("  {series:<32} {count:>5}");
        }
        println!("Teams");
        for t in profile.top_teams.iter().take(TOP_PREVIEW) {
            println!("  {:<32} {:>5}", t.team, t.matches);
        }
        println!("Arenas");
        for a in profile.top_arenas.iter().take(TOP_PREVIEW) {
            println!("  {:<32} {:>5}", a.arena, a.matches);
        }
    }

    println!();
    println!("Matches per weekday");
    for (label, count) in view.weekdays.entries() {
        println!("  {label}  {count:>5}");
    }
    println!("Matches per hour");
    for (hour, count) in view.hours.counts.iter().enumerate() {
        if *count > 0 {
            println!("  {}  {count:>5}", HourCounts::label(hour));
        }
    }
    println!("Matches per month");
    for (month, count) in &view.months {
        println!("  {month}  {count:>5}");
    }

    if !view.comparison.is_empty() {
        println!();
        println!("Comparison (matches total)");
        for row in &view.comparison {
            println!("  {:<32} {:>5}", row.referee, row.total);
        }
    } else {
        let candidates = referee_options(dataset, state).len();
        println!();
        println!("Comparison: none selected ({candidates} referees available)");
    }

    let rows = table_rows(dataset, state, &view.filtered);
    if !rows.is_empty() {
        println!();
        println!("Matches ({} shown of {})", rows.len().min(TABLE_PREVIEW), rows.len());
        for row in rows.iter().take(TABLE_PREVIEW) {
            println!(
                "  {:<10} {:<5} {:<16} {:<16} {} - {}",
                row.date, row.time, row.series, row.arena, row.home, row.away
            );
        }
    }
}

fn count_or_dash(n: usize) -> String {
    if n == 0 { "-".to_string() } else { n.to_string() }
}

fn parse_date_arg(flag: &str, raw: &str) -> Result<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("{flag} expects YYYY-MM-DD, got `{trimmed}`"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.trim().to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use refdash::DateRange;
    use refdash::filter::FilterState;

    use super::apply_args;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn remembered() -> FilterState {
        FilterState::new()
            .with_referee(Some("Smith"))
            .with_series(["Premier"])
            .with_date_range(DateRange::new(day(2024, 1, 1), day(2024, 6, 30)))
    }

    #[test]
    fn single_date_bound_keeps_the_other_remembered_bound() {
        let state = apply_args(remembered(), &args(&["--from=2024-02-01"])).unwrap();
        assert_eq!(state.date_range, DateRange::new(day(2024, 2, 1), day(2024, 6, 30)));

        let state = apply_args(remembered(), &args(&["--to", "2024-03-31"])).unwrap();
        assert_eq!(state.date_range, DateRange::new(day(2024, 1, 1), day(2024, 3, 31)));

        let state = apply_args(remembered(), &args(&["--to="])).unwrap();
        assert_eq!(state.date_range, DateRange::new(day(2024, 1, 1), None));
    }

    #[test]
    fn flags_override_only_what_they_name() {
        let state = apply_args(remembered(), &args(&["--arena", "North Hall, Old Gym"])).unwrap();
        assert_eq!(state.selected_referee(), Some("Smith"));
        assert!(state.series.contains("Premier"));
        assert_eq!(state.arenas.len(), 2);

        let state = apply_args(remembered(), &[]).unwrap();
        assert_eq!(state, remembered());
    }

    #[test]
    fn partner_needs_a_selected_referee() {
        let state = apply_args(FilterState::new(), &args(&["--partner=Jones"])).unwrap();
        assert_eq!(state.partner_focus, None);

        let state = apply_args(remembered(), &args(&["--partner=Jones"])).unwrap();
        assert_eq!(state.active_partner(), Some("Jones"));

        let state = apply_args(
            remembered(),
            &args(&["--referee", "Lee", "--partner", "Jones"]),
        )
        .unwrap();
        assert_eq!(state.selected_referee(), Some("Lee"));
        assert_eq!(state.active_partner(), Some("Jones"));
    }

    #[test]
    fn malformed_date_flag_is_an_error() {
        let err = apply_args(remembered(), &args(&["--from", "01/02/2024"])).unwrap_err();
        assert!(format!("{err:#}").contains("--from expects YYYY-MM-DD"));
    }
}
