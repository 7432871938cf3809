// ABOUTME: Renders the build recipe that runs the update commands as root.
// ABOUTME: FROM base, USER root, RUN update, USER original; one instruction per line.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecipeError {
    /// A line break would smuggle extra instructions into the recipe.
    #[error("{field} contains a line break: {value:?}")]
    LineBreak { field: &'static str, value: String },
}

/// A rendered build recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecipe(String);

impl BuildRecipe {
    /// Render the four-line recipe.
    ///
    /// Values are inserted verbatim and are not shell-escaped. An empty `user`
    /// still produces a `USER` line.
    pub fn render(base_image: &str, command: &str, user: &str) -> Result<Self, RecipeError> {
        for (field, value) in [
            ("base image", base_image),
            ("command", command),
            ("user", user),
        ] {
            if value.contains(['\n', '\r']) {
                return Err(RecipeError::LineBreak {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self(format!(
            "FROM {base_image}\nUSER root\nRUN {command}\nUSER {user}\n"
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BuildRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_template() {
        let recipe = BuildRecipe::render("alpine:3", "apk update", "nobody").unwrap();
        assert_eq!(
            recipe.as_str(),
            "FROM alpine:3\nUSER root\nRUN apk update\nUSER nobody\n"
        );
    }

    #[test]
    fn empty_user_is_kept() {
        let recipe = BuildRecipe::render("alpine:3", "apk update", "").unwrap();
        assert!(recipe.as_str().ends_with("\nUSER \n"));
    }

    #[test]
    fn line_break_in_user_is_rejected() {
        let err = BuildRecipe::render("alpine:3", "apk update", "root\nRUN rm -rf /").unwrap_err();
        assert!(matches!(err, RecipeError::LineBreak { field: "user", .. }));
    }
}
