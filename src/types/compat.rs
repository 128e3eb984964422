//! Connection legality between a tool output and a candidate input.
//!
//! Consumed by the editor's connection UI (through the wasm boundary),
//! not by the compiler itself.

use super::normalize::parse_short;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionCheck {
    pub compatible: bool,
    pub warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConnectionCheck {
    fn ok() -> Self {
        ConnectionCheck {
            compatible: true,
            warning: false,
            reason: None,
        }
    }

    fn warn(reason: impl Into<String>) -> Self {
        ConnectionCheck {
            compatible: true,
            warning: true,
            reason: Some(reason.into()),
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        ConnectionCheck {
            compatible: false,
            warning: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decide whether an output of type `output_type` may feed an input of
/// type `input_type`, with optional extension allowlists on either side.
pub fn check_connection(
    output_type: &str,
    input_type: &str,
    output_exts: Option<&[String]>,
    input_exts: Option<&[String]>,
) -> ConnectionCheck {
    let out = parse_short(output_type);
    let inp = parse_short(input_type);

    // (a) The unconstrained type accepts and matches everything.
    if out.base_type().is_none() || inp.base_type().is_none() {
        return ConnectionCheck::ok();
    }

    // (b) Array into scalar: legal, interpreted as an implicit
    // per-element scatter.
    if out.is_array() && !inp.is_array() {
        return ConnectionCheck::warn(format!(
            "array output '{}' feeds scalar input '{}'; the step will run once per element",
            output_type, input_type
        ));
    }

    // (c) Scalar into array: no implicit wrapping.
    if !out.is_array() && inp.is_array() {
        return ConnectionCheck::fail(format!(
            "scalar output '{}' cannot feed array input '{}'",
            output_type, input_type
        ));
    }

    // (d) Base types must agree, ignoring nullable/array markers.
    let out_base = out.base_type().unwrap_or("Any");
    let in_base = inp.base_type().unwrap_or("Any");
    if out_base != in_base {
        return ConnectionCheck::fail(format!(
            "type mismatch: '{}' does not match '{}'",
            output_type, input_type
        ));
    }

    // (e) File-family extension allowlists.
    if out_base == "File" || out_base == "Directory" {
        return check_extensions(output_exts, input_exts);
    }

    ConnectionCheck::ok()
}

fn check_extensions(
    output_exts: Option<&[String]>,
    input_exts: Option<&[String]>,
) -> ConnectionCheck {
    // An empty allowlist carries no information; treat it as undeclared.
    let output_exts = output_exts.filter(|e| !e.is_empty());
    let input_exts = input_exts.filter(|e| !e.is_empty());

    match (output_exts, input_exts) {
        (Some(out), Some(inp)) => {
            let overlap = out.iter().filter(|e| inp.contains(e)).count();
            if overlap == 0 {
                ConnectionCheck::fail(format!(
                    "no common file format: produces [{}], accepts [{}]",
                    out.join(", "),
                    inp.join(", ")
                ))
            } else if overlap == out.len() {
                // Every produced format is accepted.
                ConnectionCheck::ok()
            } else {
                ConnectionCheck::warn(
                    "file formats overlap only partially; some outputs may be rejected",
                )
            }
        }
        (None, None) => ConnectionCheck::ok(),
        // One side declares formats, the other is unknown.
        _ => ConnectionCheck::warn("file format of one side is undeclared"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn any_is_always_compatible() {
        assert!(check_connection("Any", "File[]", None, None).compatible);
        assert!(check_connection("File", "Any", None, None).compatible);
    }

    #[test]
    fn array_into_scalar_warns() {
        let c = check_connection("File[]", "File", None, None);
        assert!(c.compatible);
        assert!(c.warning);
    }

    #[test]
    fn scalar_into_array_fails() {
        let c = check_connection("File", "File[]", None, None);
        assert!(!c.compatible);
    }

    #[test]
    fn base_type_mismatch_fails() {
        assert!(!check_connection("string", "File", None, None).compatible);
        // Nullable markers are ignored for the base comparison.
        assert!(check_connection("string?", "string", None, None).compatible);
    }

    #[test]
    fn disjoint_extensions_fail() {
        let out = exts(&[".nii.gz"]);
        let inp = exts(&[".mgz"]);
        let c = check_connection("File", "File", Some(&out), Some(&inp));
        assert!(!c.compatible);
    }

    #[test]
    fn partial_overlap_warns() {
        let out = exts(&[".nii.gz", ".nii"]);
        let inp = exts(&[".nii.gz"]);
        let c = check_connection("File", "File", Some(&out), Some(&inp));
        assert!(c.compatible);
        assert!(c.warning);
    }

    #[test]
    fn one_sided_unknown_warns() {
        let out = exts(&[".nii.gz"]);
        let c = check_connection("File", "File", Some(&out), None);
        assert!(c.compatible);
        assert!(c.warning);
    }

    #[test]
    fn empty_allowlists_are_unconstrained() {
        let none: Vec<String> = vec![];
        let c = check_connection("File", "File", Some(&none), Some(&none));
        assert!(c.compatible);
        assert!(!c.warning);

        // Empty on one side behaves like an undeclared side.
        let out = exts(&[".nii.gz"]);
        let c = check_connection("File", "File", Some(&out), Some(&none));
        assert!(c.compatible);
        assert!(c.warning);
    }

    #[test]
    fn fully_accepted_extensions_pass() {
        let out = exts(&[".nii.gz"]);
        let inp = exts(&[".nii.gz", ".nii"]);
        let c = check_connection("File", "File", Some(&out), Some(&inp));
        assert!(c.compatible);
        assert!(!c.warning);
    }
}
