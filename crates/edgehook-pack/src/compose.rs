//! Text composer for the packed artifact.
//!
//! The artifact has the shape
//!
//! ```text
//! ;(function(){<payload>\n}(function(){if(<guard>){return;}<hooks>}()));
//! ```
//!
//! The inner function runs first and produces the outer function's argument.
//! When the guard is already set it returns early, so an artifact that is
//! packed again installs hooks once.

use std::fmt;

use crate::error::{ComposeError, InputRole};

/// Expression the artifact checks before running the hook fragment.
pub const HOOKED_GUARD: &str = "addEventListener.__hooked";

/// Output of [`compose`]. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedArtifact {
    code: String,
}

impl ComposedArtifact {
    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn into_string(self) -> String {
        self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl fmt::Display for ComposedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl AsRef<[u8]> for ComposedArtifact {
    fn as_ref(&self) -> &[u8] {
        self.code.as_bytes()
    }
}

/// Composes `hook_code` ahead of `src_code`.
///
/// `src_code` gets a trailing `\n` if it lacks one. Blank inputs are
/// rejected.
pub fn compose(hook_code: &str, src_code: &str) -> Result<ComposedArtifact, ComposeError> {
    if hook_code.trim().is_empty() {
        return Err(ComposeError::MissingInput {
            role: InputRole::Hook,
        });
    }
    if src_code.trim().is_empty() {
        return Err(ComposeError::MissingInput {
            role: InputRole::Src,
        });
    }

    let newline = if src_code.ends_with('\n') { "" } else { "\n" };

    let mut code = String::with_capacity(hook_code.len() + src_code.len() + 64);
    code.push_str(";(function(){");
    code.push_str(src_code);
    code.push_str(newline);
    code.push_str("}(function(){if(");
    code.push_str(HOOKED_GUARD);
    code.push_str("){return;}");
    code.push_str(hook_code);
    code.push_str("}()));");

    Ok(ComposedArtifact { code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_layout() {
        let artifact = compose("installHooks();", "main();").expect("compose");
        assert_eq!(
            artifact.as_str(),
            ";(function(){main();\n}(function(){if(addEventListener.__hooked){return;}installHooks();}()));"
        );
    }

    #[test]
    fn test_payload_gets_exactly_one_newline() {
        let without = compose("h();", "p();").expect("compose");
        let with = compose("h();", "p();\n").expect("compose");
        assert_eq!(without, with);
        assert!(without.as_str().contains("p();\n}"));
        assert!(!without.as_str().contains("p();\n\n"));
    }

    #[test]
    fn test_blank_inputs_are_rejected() {
        assert!(matches!(
            compose("", "p();"),
            Err(ComposeError::MissingInput {
                role: InputRole::Hook
            })
        ));
        assert!(matches!(
            compose("h();", "  \n"),
            Err(ComposeError::MissingInput {
                role: InputRole::Src
            })
        ));
    }

    #[test]
    fn test_repacking_nests_a_second_guarded_install() {
        let once = compose("h();", "p();").expect("first");
        let twice = compose("h();", once.as_str()).expect("second");

        assert!(twice.as_str().starts_with(";(function(){;(function(){p();\n}"));
        assert_eq!(twice.as_str().matches(HOOKED_GUARD).count(), 2);
        let outer_tail =
            "h();}()));\n}(function(){if(addEventListener.__hooked){return;}h();}()));";
        assert!(twice.as_str().ends_with(outer_tail));
    }
}
