/// Display and identifier formatting for watershed names.

/// Longest title shown in the watershed navigation list.
const MAX_TITLE_LENGTH: usize = 30;

/// Formats a watershed or subbasin name for use in folder names and codes.
///
/// Trims, turns spaces into underscores, lowercases, drops anything outside
/// `[a-z0-9_-]` and strips leading `-`/`_`.
pub fn format_name(name: &str) -> String {
    let formatted: String = name
        .trim()
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    formatted.trim_start_matches(['-', '_']).to_string()
}

/// Formats the navigation title `"<watershed> (<subbasin>)"`, truncated to
/// fit the title budget.
///
/// A watershed name over budget is cut and ends in `...` with no subbasin.
/// Otherwise the subbasin is cut to the remaining budget and ends in ` ...)`.
/// When fewer than three characters of budget remain, the subbasin cut is
/// empty (`"<watershed> ( ...)"`); the budget never wraps around to keep
/// the start of the subbasin.
pub fn format_watershed_title(watershed: &str, subbasin: &str) -> String {
    let watershed = watershed.trim();
    let subbasin = subbasin.trim();

    let watershed_length = watershed.chars().count();
    if watershed_length > MAX_TITLE_LENGTH {
        let cut: String = watershed.chars().take(MAX_TITLE_LENGTH - 1).collect();
        return format!("{}...", cut.trim());
    }

    let remaining = MAX_TITLE_LENGTH - watershed_length;
    if subbasin.chars().count() > remaining {
        let cut: String = subbasin.chars().take(remaining.saturating_sub(3)).collect();
        return format!("{} ({} ...)", watershed, cut.trim());
    }

    format!("{} ({})", watershed, subbasin)
}
