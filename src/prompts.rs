//! Prompt templates and the two prompt composers.
//!
//! Both composers are pure: the same inputs always yield byte-identical text.

use crate::models::{FieldMapping, LengthLimit, PosterField, ThemeDirective, SUGGESTED_THEME_KEY};

pub const FIELD_INSTRUCTION: &str = include_str!("../data/prompts/field_instruction.txt");
pub const THEME_EXPAND: &str = include_str!("../data/prompts/theme_expand.txt");
pub const THEME_INFER: &str = include_str!("../data/prompts/theme_infer.txt");
pub const POSTER_LAYOUT: &str = include_str!("../data/prompts/poster_layout.txt");

pub const POSTER_SIZE: &str = "1024x1024";

/// Key the text model uses for a refined user-supplied theme.
const REFINED_THEME_KEY: &str = "theme";

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is a single pass, so values that happen to contain
/// placeholder syntax are inserted literally. Unknown placeholders are left
/// untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push_str("{{");
                        result.push_str(key);
                        result.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

fn theme_guidance(theme: &ThemeDirective) -> String {
    let guidance = match theme {
        ThemeDirective::UserSupplied(text) => render(THEME_EXPAND, &[("theme", text)]),
        ThemeDirective::Infer => THEME_INFER.to_string(),
    };
    guidance.trim().to_string()
}

fn theme_rule(theme: &ThemeDirective) -> (&'static str, String) {
    match theme {
        ThemeDirective::UserSupplied(_) => (
            REFINED_THEME_KEY,
            format!(
                "- The user provided a theme: expand and regulate it, and return the refined version under the key '{}', replacing the original.",
                REFINED_THEME_KEY
            ),
        ),
        ThemeDirective::Infer => (
            SUGGESTED_THEME_KEY,
            format!(
                "- The theme was not provided: add a key called '{}' with the generated description.",
                SUGGESTED_THEME_KEY
            ),
        ),
    }
}

fn token_limits() -> String {
    PosterField::ALL
        .iter()
        .map(|field| {
            let spec = field.spec();
            match spec.limit {
                LengthLimit::Tokens(max) => {
                    format!("- \"{}\": max {} tokens ({})", spec.key, max, spec.shape)
                }
                LengthLimit::VeryShort => {
                    format!("- \"{}\": very short and clean ({})", spec.key, spec.shape)
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the instruction sent to the text model.
pub fn compose_field_instruction(
    fields: &[PosterField],
    main_intent: &str,
    theme: &ThemeDirective,
) -> String {
    let field_list = if fields.is_empty() {
        "none".to_string()
    } else {
        fields
            .iter()
            .map(|field| field.key())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let (theme_key, rule) = theme_rule(theme);

    render(
        FIELD_INSTRUCTION,
        &[
            ("fields", &field_list),
            ("intent", main_intent),
            ("theme_guidance", &theme_guidance(theme)),
            ("theme_rule", &rule),
            ("token_limits", &token_limits()),
            ("theme_key", theme_key),
        ],
    )
    .trim()
    .to_string()
}

/// One placement directive per recognised field present in `fields`.
pub fn layout_lines(fields: &FieldMapping) -> Vec<String> {
    PosterField::ALL
        .iter()
        .filter_map(|field| {
            let spec = field.spec();
            fields
                .field(*field)
                .map(|value| format!("- {}: {} \"{}\"", spec.zone, spec.treatment, value))
        })
        .collect()
}

/// Build the prompt sent to the image model. `theme` must already be
/// resolved (see [`crate::fields::resolve_theme`]).
pub fn compose_poster_prompt(fields: &FieldMapping, theme: &str) -> String {
    let lines = layout_lines(fields);
    let layout = if lines.is_empty() {
        "- No text elements; render the background theme only.".to_string()
    } else {
        lines.join("\n")
    };

    render(
        POSTER_LAYOUT,
        &[("size", POSTER_SIZE), ("layout", &layout), ("theme", theme)],
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{resolve_theme, FALLBACK_THEME};
    use pretty_assertions::assert_eq;

    fn bootcamp_fields() -> FieldMapping {
        FieldMapping::new()
            .with("hero_headline", "Code Your Future")
            .with("cta", "Enroll Now")
            .with("suggested_theme", "Sunlit loft classroom with chalkboard greens")
    }

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        assert_eq!(
            render("{{a}} / {{b}}", &[("a", "{{b}}"), ("b", "x")]),
            "{{b}} / x"
        );
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed_placeholders() {
        assert_eq!(render("{{missing}} {{open", &[]), "{{missing}} {{open");
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(FIELD_INSTRUCTION.contains("{{fields}}"));
        assert!(FIELD_INSTRUCTION.contains("{{intent}}"));
        assert!(FIELD_INSTRUCTION.contains("{{token_limits}}"));
        assert!(THEME_EXPAND.contains("{{theme}}"));
        assert!(POSTER_LAYOUT.contains("{{layout}}"));
        assert!(POSTER_LAYOUT.contains("{{theme}}"));
    }

    #[test]
    fn test_field_instruction_lists_fields_and_intent() {
        let instruction = compose_field_instruction(
            &[PosterField::HeroHeadline, PosterField::Cta],
            "Bootcamp ad",
            &ThemeDirective::Infer,
        );

        assert!(instruction.contains("following fields: hero_headline, cta."));
        assert!(instruction.contains("Main intent: \"Bootcamp ad\""));
        assert!(instruction.contains("clean JSON object only"));
        assert!(!instruction.contains("{{"));
    }

    #[test]
    fn test_field_instruction_includes_every_length_limit() {
        let instruction =
            compose_field_instruction(&[PosterField::Cta], "Bootcamp ad", &ThemeDirective::Infer);

        for line in [
            "- \"hero_headline\": max 12 tokens",
            "- \"hero_subline\": max 15 tokens",
            "- \"description\": max 25 tokens",
            "- \"testimonial\": max 25 tokens",
            "- \"success_metrics\": max 20 tokens",
            "- \"target_audience\": max 15 tokens",
            "- \"cta\": very short and clean",
            "- \"cta_link\": very short and clean",
        ] {
            assert!(instruction.contains(line), "missing limit line: {}", line);
        }
    }

    #[test]
    fn test_field_instruction_is_theme_sensitive() {
        let fields = [PosterField::HeroHeadline];
        let inferred = compose_field_instruction(&fields, "Bootcamp ad", &ThemeDirective::Infer);
        let supplied = compose_field_instruction(
            &fields,
            "Bootcamp ad",
            &ThemeDirective::UserSupplied("rainy Tokyo alley".to_string()),
        );

        assert_ne!(inferred, supplied);
        assert!(inferred.contains("did not provide a theme"));
        assert!(inferred.contains("suggested_theme"));

        assert!(supplied.contains("rough theme: 'rainy Tokyo alley'"));
        assert!(supplied.contains("under the key 'theme'"));
        assert!(!supplied.contains("suggested_theme"));
    }

    #[test]
    fn test_field_instruction_is_deterministic() {
        let theme = ThemeDirective::UserSupplied("forest".to_string());
        let fields = PosterField::ALL;
        assert_eq!(
            compose_field_instruction(&fields, "Yoga retreat", &theme),
            compose_field_instruction(&fields, "Yoga retreat", &theme)
        );
    }

    #[test]
    fn test_field_instruction_with_no_fields() {
        let instruction = compose_field_instruction(&[], "Bootcamp ad", &ThemeDirective::Infer);
        assert!(instruction.contains("following fields: none."));
    }

    #[test]
    fn test_layout_lines_follow_canonical_order() {
        let fields = FieldMapping::new()
            .with("cta_link", "https://learn.example")
            .with("success_metrics", "95% hired | 10k alumni")
            .with("hero_headline", "Code Your Future");

        assert_eq!(
            layout_lines(&fields),
            vec![
                "- Top center: Large bold heading \"Code Your Future\"".to_string(),
                "- Bottom left: Compact highlight of achievements \"95% hired | 10k alumni\""
                    .to_string(),
                "- Very bottom: Minimal hyperlink \"https://learn.example\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_layout_lines_ignore_unrecognised_keys() {
        let fields = FieldMapping::new()
            .with("suggested_theme", "Neon")
            .with("theme", "Neon")
            .with("footer", "(c) 2026");
        assert!(layout_lines(&fields).is_empty());
    }

    #[test]
    fn test_poster_prompt_omits_absent_fields() {
        let fields = bootcamp_fields();
        let prompt = compose_poster_prompt(&fields, &resolve_theme(&fields, None));

        assert_eq!(layout_lines(&fields).len(), 2);
        assert!(prompt.contains("\"Code Your Future\""));
        assert!(prompt.contains("\"Enroll Now\""));
        assert!(!prompt.contains("Just below the headline"));
        assert!(!prompt.contains("Center area"));
        assert!(prompt.contains("Background Theme:\nSunlit loft classroom with chalkboard greens"));
    }

    #[test]
    fn test_poster_prompt_never_shows_raw_field_keys() {
        let fields: FieldMapping = PosterField::ALL
            .iter()
            .map(|field| (field.key().to_string(), format!("value {}", *field as usize)))
            .collect();
        let prompt = compose_poster_prompt(&fields, FALLBACK_THEME);

        for field in PosterField::ALL {
            assert!(
                !prompt.contains(field.key()),
                "raw key {} leaked into prompt",
                field.key()
            );
        }
        assert_eq!(layout_lines(&fields).len(), 8);
    }

    #[test]
    fn test_poster_prompt_with_no_fields_keeps_background() {
        let prompt = compose_poster_prompt(&FieldMapping::new(), FALLBACK_THEME);
        assert!(prompt.contains("render the background theme only"));
        assert!(prompt.contains(FALLBACK_THEME));
    }

    #[test]
    fn test_poster_prompt_is_trimmed_and_sized() {
        let prompt = compose_poster_prompt(&bootcamp_fields(), "Ocean");
        assert!(prompt.starts_with("Design a premium 1024x1024 promotional poster."));
        assert_eq!(prompt, prompt.trim());
        assert!(prompt.contains("sans-serif"));
        assert!(prompt.contains("Do not include any field labels"));
    }
}
