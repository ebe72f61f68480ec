//! MarkdownV2 rendering of bot replies.

use crate::bot::telegram::User;
use crate::lookup::BinReport;
use crate::session::GenerationReport;
use crate::types::{BinInfo, Cvv};
use std::time::Duration;

/// Placeholder for metadata the lookup service did not provide.
pub const UNKNOWN: &str = "Unknown";

const TITLE: &str = "*Card Generator*";

/// Escape text for Telegram MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &str = r"_*[]()~`>#+-={}.!|:\";
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn separator(width: usize) -> String {
    r" \-".repeat(width)
}

fn field(value: Option<&String>) -> String {
    escape_markdown(value.map(String::as_str).unwrap_or(UNKNOWN))
}

fn seconds(elapsed: Duration) -> String {
    escape_markdown(&format!("{:.2}", elapsed.as_secs_f64()))
}

/// Render a generated batch.
pub fn render_generation(report: &GenerationReport, username: Option<&str>) -> String {
    let sep = separator(25);
    let record = &report.record;
    let date = record.base_month_year.to_string().replace('/', "|");
    let cvv = match &record.base_cvv {
        Cvv::Known(code) => code.as_str(),
        Cvv::Unknown => "rnd",
    };

    let cards: String = report.cards.iter().map(|card| format!("`{}`\n", card)).collect();

    format!(
        "{title} \\| Generated Cards:\n\
         {sep}\n \\- `{base}|{date}|{cvv}`\n\
         {sep}\n\
         {cards}\
         {sep}\n\
         {info}\
         {sep}\n\
         *Gen By*: @{user}\n\
         *Time*: {time}s",
        title = TITLE,
        sep = sep,
        base = record.base_card,
        date = date,
        cvv = cvv,
        cards = cards,
        info = render_bin_summary(report.bin_info.as_ref()),
        user = escape_markdown(username.unwrap_or("N/A")),
        time = seconds(report.elapsed),
    )
}

fn render_bin_summary(info: Option<&BinInfo>) -> String {
    let empty = BinInfo::default();
    let info = info.unwrap_or(&empty);
    let flag = info.country_flag.as_deref().unwrap_or_default();

    format!(
        "*Info*: `{} \\- {} \\- {}`\n*Bank*: `{}`\n*Country*: `{} {}`\n",
        field(info.brand.as_ref()),
        field(info.card_type.as_ref()),
        field(info.level.as_ref()),
        field(info.bank.as_ref()),
        field(info.country_name.as_ref()),
        flag,
    )
}

/// Render a standalone BIN lookup.
pub fn render_bin(report: &BinReport) -> String {
    let sep = separator(15);
    let Some(info) = &report.info else {
        return format!("❌ No information found for BIN `{}`", report.bin);
    };

    format!(
        "{title} \\| BIN Lookup:\n\
         {sep}\n\
         *Bin*: `{bin}`\n\
         {sep}\n\
         *Brand*: `{brand}`\n\
         *Type*: `{card_type}`\n\
         *Level*: `{level}`\n\
         *Bank*: `{bank}`\n\
         *Country*: `{flag} \\| {code} \\| {country}`\n\
         {sep}\n\
         *Time*: {time}s",
        title = TITLE,
        sep = sep,
        bin = report.bin,
        brand = field(info.brand.as_ref()),
        card_type = field(info.card_type.as_ref()),
        level = field(info.level.as_ref()),
        bank = field(info.bank.as_ref()),
        flag = info.country_flag.as_deref().unwrap_or("🏳️"),
        code = escape_markdown(info.country_code.as_deref().unwrap_or("XX")),
        country = field(info.country_name.as_ref()),
        time = seconds(report.elapsed),
    )
}

/// Greeting for the `start` command.
pub fn render_start(user: Option<&User>) -> String {
    let username = user.and_then(|u| u.username.as_deref()).unwrap_or("N/A");
    let name = user
        .map(|u| u.first_name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN);
    let id = user.map(|u| u.id.to_string()).unwrap_or_else(|| "N/A".to_string());

    format!(
        "{} \\| *Home*\n\
         {}\n\
         *Name*: {}\n\
         *User*: @{}\n\
         *Id*: {}\n\
         {}\n\
         Send `/gen CC\\|MM\\|YY\\|CVV` to generate cards or `/bin BIN` to look up an issuer\\.",
        TITLE,
        separator(20),
        escape_markdown(name),
        escape_markdown(username),
        escape_markdown(&id),
        separator(20),
    )
}

/// Usage hint for `gen` without arguments.
pub fn gen_usage() -> String {
    let sep = separator(25);
    format!(
        "{} \\| Generate Cards:\n{sep}\n*Invalid Command\\!* ⚠️\n{sep}\n*Command*: \\/gen `CC\\|MM\\|YY\\|CVV`",
        TITLE,
        sep = sep,
    )
}

/// Usage hint for `bin` without arguments.
pub fn bin_usage() -> String {
    let sep = separator(25);
    format!(
        "{} \\| BIN Lookup:\n{sep}\n*Invalid Command\\!* ⚠️\n{sep}\n*Command*: \\/bin `BIN`",
        TITLE,
        sep = sep,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeneratedCard, MonthYear, SessionRecord};

    fn report(bin_info: Option<BinInfo>) -> GenerationReport {
        GenerationReport {
            session_id: "regen_1_0001".to_string(),
            record: SessionRecord {
                base_card: "411111xxxxxxxxxx".to_string(),
                base_month_year: MonthYear::Known {
                    month: "12".to_string(),
                    year: "26".to_string(),
                },
                base_cvv: Cvv::Unknown,
                resolved_month: Some("12".to_string()),
                resolved_year: Some("2026".to_string()),
                bin_prefix: "411111".to_string(),
            },
            cards: vec![GeneratedCard {
                number: "4111111111111111".to_string(),
                month: "12".to_string(),
                year: "2026".to_string(),
                cvv: "123".to_string(),
            }],
            bin_info,
            elapsed: Duration::from_millis(1250),
        }
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a.b-c"), r"a\.b\-c");
        assert_eq!(escape_markdown("JP MORGAN (CHASE)"), r"JP MORGAN \(CHASE\)");
        assert_eq!(escape_markdown("plain"), "plain");
    }

    #[test]
    fn test_generation_header_and_cards() {
        let text = render_generation(&report(None), Some("ana_b"));

        assert!(text.contains("`411111xxxxxxxxxx|12|26|rnd`"));
        assert!(text.contains("`4111111111111111|12|2026|123`"));
        assert!(text.contains(r"*Gen By*: @ana\_b"));
        assert!(text.contains(r"*Time*: 1\.25s"));
    }

    #[test]
    fn test_missing_bin_info_renders_unknown() {
        let text = render_generation(&report(None), None);

        assert!(text.contains(r"*Info*: `Unknown \- Unknown \- Unknown`"));
        assert!(text.contains("*Bank*: `Unknown`"));
        assert!(text.contains("*Gen By*: @N/A"));
    }

    #[test]
    fn test_partial_bin_info() {
        let info = BinInfo {
            brand: Some("VISA".to_string()),
            bank: Some("JPMORGAN CHASE BANK N.A.".to_string()),
            country_flag: Some("🇺🇸".to_string()),
            ..Default::default()
        };
        let text = render_generation(&report(Some(info)), None);

        assert!(text.contains(r"*Info*: `VISA \- Unknown \- Unknown`"));
        assert!(text.contains(r"*Bank*: `JPMORGAN CHASE BANK N\.A\.`"));
        assert!(text.contains("*Country*: `Unknown 🇺🇸`"));
    }

    #[test]
    fn test_render_bin() {
        let report = BinReport {
            bin: "411111".to_string(),
            info: Some(BinInfo {
                brand: Some("VISA".to_string()),
                country_code: Some("US".to_string()),
                ..Default::default()
            }),
            elapsed: Duration::from_millis(300),
        };
        let text = render_bin(&report);

        assert!(text.contains("*Bin*: `411111`"));
        assert!(text.contains("*Brand*: `VISA`"));
        assert!(text.contains(r"\| US \|"));
        assert!(text.contains(r"*Time*: 0\.30s"));
    }

    #[test]
    fn test_render_bin_not_found() {
        let report = BinReport {
            bin: "000000".to_string(),
            info: None,
            elapsed: Duration::ZERO,
        };
        assert!(render_bin(&report).contains("No information found"));
    }

    #[test]
    fn test_render_start() {
        let user = User {
            id: 42,
            username: Some("ana_b".to_string()),
            first_name: "Ana".to_string(),
        };
        let text = render_start(Some(&user));
        assert!(text.contains("*Name*: Ana"));
        assert!(text.contains(r"*User*: @ana\_b"));
        assert!(text.contains("*Id*: 42"));

        let anonymous = render_start(None);
        assert!(anonymous.contains("*Name*: Unknown"));
        assert!(anonymous.contains("*User*: @N/A"));
    }
}
