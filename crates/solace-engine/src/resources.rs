use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Crisis,
    General,
    CopingStrategies,
}

impl ResourceCategory {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "crisis" => Some(Self::Crisis),
            "general" => Some(Self::General),
            "coping_strategies" => Some(Self::CopingStrategies),
            _ => None,
        }
    }
}

/// One support contact or coping technique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<&'static str>,
    /// Domain a coping strategy targets (anxiety, stress, depression).
    #[serde(rename = "category", skip_serializing_if = "Option::is_none")]
    pub tagged_domain: Option<&'static str>,
}

const CRISIS: &[Resource] = &[
    Resource {
        name: "National Suicide Prevention Lifeline",
        description: "24/7 crisis support and suicide prevention",
        phone: Some("988"),
        website: None,
        tagged_domain: None,
    },
    Resource {
        name: "Crisis Text Line",
        description: "24/7 crisis support via text",
        phone: Some("Text HOME to 741741"),
        website: None,
        tagged_domain: None,
    },
    Resource {
        name: "International Association for Suicide Prevention",
        description: "Global crisis centers directory",
        phone: None,
        website: Some("https://www.iasp.info/resources/Crisis_Centres/"),
        tagged_domain: None,
    },
];

const GENERAL: &[Resource] = &[
    Resource {
        name: "Mental Health America",
        description: "Mental health resources and support",
        phone: None,
        website: Some("https://www.mhanational.org/finding-help"),
        tagged_domain: None,
    },
    Resource {
        name: "NAMI (National Alliance on Mental Illness)",
        description: "Mental health education and support",
        phone: None,
        website: Some("https://www.nami.org/help"),
        tagged_domain: None,
    },
    Resource {
        name: "Psychology Today Therapist Finder",
        description: "Find therapists and mental health professionals",
        phone: None,
        website: Some("https://www.psychologytoday.com/us/therapists"),
        tagged_domain: None,
    },
];

const COPING_STRATEGIES: &[Resource] = &[
    Resource {
        name: "Box Breathing",
        description: "Breathe in for 4, hold for 4, out for 4, hold for 4. Repeat 4 times.",
        phone: None,
        website: None,
        tagged_domain: Some("anxiety"),
    },
    Resource {
        name: "5-4-3-2-1 Grounding",
        description: "Name 5 things you see, 4 you can touch, 3 you hear, 2 you smell, 1 you taste.",
        phone: None,
        website: None,
        tagged_domain: Some("anxiety"),
    },
    Resource {
        name: "Progressive Muscle Relaxation",
        description: "Tense and relax each muscle group from toes to head.",
        phone: None,
        website: None,
        tagged_domain: Some("stress"),
    },
    Resource {
        name: "Thought Reframing",
        description: "Challenge negative thoughts by asking: Is this realistic? What would I tell a friend?",
        phone: None,
        website: None,
        tagged_domain: Some("depression"),
    },
];

/// The whole catalog, keyed by category.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogView {
    pub crisis: &'static [Resource],
    pub general: &'static [Resource],
    pub coping_strategies: &'static [Resource],
}

/// Read-only reference data for the life of the process.
#[derive(Clone, Debug)]
pub struct ResourceCatalog {
    crisis: &'static [Resource],
    general: &'static [Resource],
    coping_strategies: &'static [Resource],
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResourceCatalog {
    pub fn standard() -> Self {
        Self {
            crisis: CRISIS,
            general: GENERAL,
            coping_strategies: COPING_STRATEGIES,
        }
    }

    pub fn category(&self, category: ResourceCategory) -> &'static [Resource] {
        match category {
            ResourceCategory::Crisis => self.crisis,
            ResourceCategory::General => self.general,
            ResourceCategory::CopingStrategies => self.coping_strategies,
        }
    }

    /// Lookup by wire name. Unknown names yield an empty list.
    pub fn get(&self, name: &str) -> &'static [Resource] {
        match ResourceCategory::parse(name) {
            Some(category) => self.category(category),
            None => &[],
        }
    }

    pub fn all(&self) -> CatalogView {
        CatalogView {
            crisis: self.crisis,
            general: self.general,
            coping_strategies: self.coping_strategies,
        }
    }
}
