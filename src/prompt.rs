use crate::db::models::AvatarRow;

/// Base clause sent with every generation request. Kept free of commas so the
/// final prompt stays one clause per comma-separated segment.
const BASE_PROMPT: &str =
    "Professional portrait photograph of a character with centered composition and soft studio lighting and sharp focus";

fn push_labeled(clauses: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        let value = value.trim();
        if !value.is_empty() {
            clauses.push(format!("{label}: {value}"));
        }
    }
}

/// Builds the single descriptive prompt for an avatar. Labeled clauses are
/// appended in a fixed order, skipping blank attributes; the optional extra
/// fragment comes last, unlabeled. Deterministic and always non-empty.
pub fn build_prompt(avatar: &AvatarRow, extra_prompt: Option<&str>) -> String {
    let mut clauses = vec![BASE_PROMPT.to_string()];

    push_labeled(&mut clauses, "style", avatar.style.as_deref());
    push_labeled(&mut clauses, "hair color", avatar.hair_color.as_deref());
    push_labeled(&mut clauses, "eye color", avatar.eye_color.as_deref());
    push_labeled(&mut clauses, "personality", avatar.personality.as_deref());

    if let Some(extra) = extra_prompt {
        let extra = extra.trim();
        if !extra.is_empty() {
            clauses.push(extra.to_string());
        }
    }

    clauses.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn avatar(
        style: Option<&str>,
        hair: Option<&str>,
        eye: Option<&str>,
        personality: Option<&str>,
    ) -> AvatarRow {
        AvatarRow {
            id: "avatar-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Luna".to_string(),
            style: style.map(str::to_string),
            hair_color: hair.map(str::to_string),
            eye_color: eye.map(str::to_string),
            personality: personality.map(str::to_string),
            generated_image_url: None,
            generated_image_prompt: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn name_only_avatar_yields_the_bare_base_clause() {
        let prompt = build_prompt(&avatar(None, None, None, None), None);
        assert_eq!(prompt, BASE_PROMPT);
    }

    #[test]
    fn all_attributes_plus_extra_produce_six_ordered_clauses() {
        let prompt = build_prompt(
            &avatar(Some("anime"), Some("silver"), Some("green"), Some("curious")),
            Some("wearing a red scarf"),
        );
        let clauses: Vec<&str> = prompt.split(", ").collect();
        assert_eq!(
            clauses,
            vec![
                BASE_PROMPT,
                "style: anime",
                "hair color: silver",
                "eye color: green",
                "personality: curious",
                "wearing a red scarf",
            ]
        );
    }

    #[test]
    fn blank_attributes_are_omitted() {
        let prompt = build_prompt(&avatar(Some("  "), Some("red"), None, Some("")), Some("   "));
        assert_eq!(prompt, format!("{BASE_PROMPT}, hair color: red"));
    }

    #[test]
    fn attribute_values_are_trimmed() {
        let prompt = build_prompt(&avatar(Some("  realistic "), None, None, None), None);
        assert_eq!(prompt, format!("{BASE_PROMPT}, style: realistic"));
    }
}
