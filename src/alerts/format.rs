use crate::monitoring::detector::{AssetKind, ChangeEvent};
use crate::utils::short_id;

pub fn format_title(event: &ChangeEvent) -> String {
    let label = match event.asset {
        AssetKind::Primary => "Balance",
        AssetKind::Secondary(_) => "Token",
    };
    format!("{} Update: {}", label, event.direction.label())
}

pub fn format_body(event: &ChangeEvent) -> String {
    match &event.asset {
        AssetKind::Primary => format!(
            "Asset: SOL ☀️\nOld Balance: {} SOL\nNew Balance: {} SOL\nChange: {} SOL",
            event.old_amount, event.new_amount, event.delta
        ),
        AssetKind::Secondary(asset) => format!(
            "Asset: Token ({}) 🪙\nOld Balance: {}\nNew Balance: {}\nChange: {}",
            short_id(asset.as_str()),
            event.old_amount,
            event.new_amount,
            event.delta
        ),
    }
}

/// `(title, body)` ready for [`super::AlertSink::deliver`].
pub fn render(event: &ChangeEvent) -> (String, String) {
    (format_title(event), format_body(event))
}
