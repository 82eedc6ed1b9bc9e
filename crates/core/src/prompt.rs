//! Synthesis prompt construction.
//!
//! The provider receives a short English description composed from the
//! clothing description, the customer's gender term, and optional body
//! attributes: `"{description} for {gender}, {body fragments}"`.

/// Fallback description when neither the catalog prompt nor any upload
/// metadata yields a usable text fragment.
pub const GENERIC_CLOTHING_DESCRIPTION: &str = "clothing";

/// Customer gender as used for prompt composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl Gender {
    /// English noun used in the prompt.
    pub fn prompt_term(self) -> &'static str {
        match self {
            Gender::Male => "man",
            Gender::Female => "woman",
        }
    }

    /// Parse the stored text form (`male` / `female`). Anything else
    /// falls back to female, matching the original intake default.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("male") => Gender::Male,
            _ => Gender::Female,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Body-shape category. Stored values are the English category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Natural,
    Straight,
    Wave,
}

impl BodyShape {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "natural" => Some(BodyShape::Natural),
            "straight" => Some(BodyShape::Straight),
            "wave" => Some(BodyShape::Wave),
            _ => None,
        }
    }

    /// Prompt fragment describing the body shape.
    pub fn descriptor(self) -> &'static str {
        match self {
            BodyShape::Natural => "natural body shape",
            BodyShape::Straight => "straight body shape",
            BodyShape::Wave => "wave body shape",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyShape::Natural => "natural",
            BodyShape::Straight => "straight",
            BodyShape::Wave => "wave",
        }
    }
}

/// Optional body attributes feeding prompt construction.
///
/// Height and weight are free-form bucket labels from the intake UI
/// (e.g. `"160-165cm"`, `"50-55kg"`) and are passed through verbatim.
#[derive(Debug, Clone, Default)]
pub struct BodyProfile {
    pub body_shape: Option<BodyShape>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

impl BodyProfile {
    fn fragments(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(shape) = self.body_shape {
            parts.push(shape.descriptor().to_string());
        }
        if let Some(height) = &self.height {
            parts.push(format!("height {height}"));
        }
        if let Some(weight) = &self.weight {
            parts.push(format!("weight {weight}"));
        }
        parts
    }
}

/// Compose the synthesis prompt for one fitting.
///
/// An empty or whitespace-only clothing description falls back to
/// [`GENERIC_CLOTHING_DESCRIPTION`].
pub fn compose_prompt(clothing_description: &str, gender: Gender, body: &BodyProfile) -> String {
    let description = if clothing_description.trim().is_empty() {
        GENERIC_CLOTHING_DESCRIPTION
    } else {
        clothing_description.trim()
    };

    let mut prompt = format!("{description} for {}", gender.prompt_term());

    let fragments = body.fragments();
    if !fragments.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(&fragments.join(", "));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_prompt_uses_gender_term() {
        let prompt = compose_prompt("red floral dress", Gender::Female, &BodyProfile::default());
        assert_eq!(prompt, "red floral dress for woman");

        let prompt = compose_prompt("navy suit", Gender::Male, &BodyProfile::default());
        assert_eq!(prompt, "navy suit for man");
    }

    #[test]
    fn empty_description_falls_back_to_generic() {
        let prompt = compose_prompt("  ", Gender::Female, &BodyProfile::default());
        assert_eq!(prompt, "clothing for woman");
    }

    #[test]
    fn body_attributes_are_appended_in_order() {
        let body = BodyProfile {
            body_shape: Some(BodyShape::Wave),
            height: Some("160-165cm".to_string()),
            weight: Some("50-55kg".to_string()),
        };
        let prompt = compose_prompt("pleated skirt", Gender::Female, &body);
        assert_eq!(
            prompt,
            "pleated skirt for woman, wave body shape, height 160-165cm, weight 50-55kg"
        );
    }

    #[test]
    fn partial_body_profile_skips_missing_fragments() {
        let body = BodyProfile {
            body_shape: None,
            height: Some("175-180cm".to_string()),
            weight: None,
        };
        let prompt = compose_prompt("denim jacket", Gender::Male, &body);
        assert_eq!(prompt, "denim jacket for man, height 175-180cm");
    }

    #[test]
    fn gender_parsing_defaults_to_female() {
        assert_eq!(Gender::parse_or_default(Some("male")), Gender::Male);
        assert_eq!(Gender::parse_or_default(Some("female")), Gender::Female);
        assert_eq!(Gender::parse_or_default(Some("other")), Gender::Female);
        assert_eq!(Gender::parse_or_default(None), Gender::Female);
    }

    #[test]
    fn body_shape_parsing() {
        assert_eq!(BodyShape::parse("natural"), Some(BodyShape::Natural));
        assert_eq!(BodyShape::parse("straight"), Some(BodyShape::Straight));
        assert_eq!(BodyShape::parse("wave"), Some(BodyShape::Wave));
        assert_eq!(BodyShape::parse("hourglass"), None);
    }
}
