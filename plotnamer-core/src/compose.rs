use crate::dimension::DimensionClass;
use crate::machine::MachineTag;
use regex::Regex;
use std::sync::OnceLock;

/// Compose the canonical production filename:
/// `{code}_{stem} {machine}{(FT.wxh)?}(Q.{qty})%%{ext}`.
///
/// The trailing `%%` is an unconditional literal marking the file as not yet
/// finalized; the finalize pass later replaces it with `%{category}%`.
pub fn compose_name(
    stem: &str,
    party_code: &str,
    extension: &str,
    dim: Option<&DimensionClass>,
    quantity: u32,
    machine: MachineTag,
) -> String {
    let dim_part = dim.map(DimensionClass::suffix).unwrap_or_default();
    format!("{party_code}_{stem} {machine}{dim_part}(Q.{quantity})%%{extension}")
}

fn pending_block() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(Q\.\d+\)%%?").unwrap())
}

/// Rewrite an already-processed filename with operator-corrected quantity and
/// category, and mark the machine tag `[ok]`.
///
/// Returns `None` when the name already carries `[ok]` so a repeated finalize
/// attempt never double-marks. An existing `(Q.n)%%` (or partially finalized
/// `(Q.n)%cat%`) block is stripped before the new one is appended; an empty
/// category renders as `%%`.
pub fn finalize_name(
    stem: &str,
    extension: &str,
    quantity: u32,
    category: &str,
    machine: MachineTag,
) -> Option<String> {
    if stem.contains("[ok]") {
        return None;
    }

    let base = match pending_block().find(stem) {
        Some(m) => &stem[..m.start()],
        None => stem,
    };

    let tag = machine.tag();
    let marked = if base.contains(tag) {
        base.replace(tag, &format!("{tag}[ok]"))
    } else {
        base.to_string()
    };

    Some(format!(
        "{marked}(Q.{quantity})%{category}%{extension}"
    ))
}
