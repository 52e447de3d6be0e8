/// A chat model the provider is known to work with.
#[derive(Clone, Debug)]
pub struct ModelInfo {
    pub name: &'static str,
}

pub static GPT_4O_MINI: ModelInfo = ModelInfo { name: "gpt-4o-mini" };

pub static GPT_4O: ModelInfo = ModelInfo { name: "gpt-4o" };

pub static GPT_4_1_MINI: ModelInfo = ModelInfo { name: "gpt-4.1-mini" };

pub static ALL_MODELS: &[&ModelInfo] = &[&GPT_4O_MINI, &GPT_4O, &GPT_4_1_MINI];

pub fn find_model(name: &str) -> Option<&'static ModelInfo> {
    ALL_MODELS.iter().find(|m| m.name == name).copied()
}

pub fn default_model() -> &'static ModelInfo {
    &GPT_4O_MINI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mini() {
        assert_eq!(default_model().name, "gpt-4o-mini");
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find_model("gpt-4o").map(|m| m.name), Some("gpt-4o"));
        assert!(find_model("not-a-model").is_none());
    }
}
