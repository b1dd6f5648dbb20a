//! Loaded definition tables, served to the engine through its oracle traits.

use std::collections::BTreeMap;

use progression_core::{
    AttributeDefinition, AttributeKey, AttributeOracle, ClassDefinition, ClassGroup, ClassId, ClassOracle,
    GroupSettings, ProgressionConfig, ProgressionEnv, Requirement, SkillDefinition, SkillKey,
    SkillOracle,
};

use crate::loaders::{AttributeLoader, ClassCatalog, ClassLoader, ConfigLoader, LoadResult, SkillLoader};

const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");
const EMBEDDED_ATTRIBUTES: &str = include_str!("../../data/attributes.ron");
const EMBEDDED_SKILLS: &str = include_str!("../../data/skills.ron");
const EMBEDDED_CLASSES: &str = include_str!("../../data/classes.ron");

/// Every definition table plus the engine configuration.
///
/// Construction rejects duplicate keys and dangling references, so lookups
/// made by the engine only miss for keys that were never defined.
#[derive(Debug, Clone, Default)]
pub struct ContentBundle {
    config: ProgressionConfig,
    attributes: Vec<AttributeDefinition>,
    skills: BTreeMap<SkillKey, SkillDefinition>,
    classes: BTreeMap<ClassId, ClassDefinition>,
    groups: BTreeMap<ClassGroup, GroupSettings>,
}

impl ContentBundle {
    pub fn new(
        config: ProgressionConfig,
        attributes: Vec<AttributeDefinition>,
        skills: Vec<SkillDefinition>,
        classes: ClassCatalog,
    ) -> LoadResult<Self> {
        let mut bundle = Self {
            config,
            ..Self::default()
        };

        for def in attributes {
            anyhow::ensure!(
                bundle.attributes.iter().all(|known| known.key != def.key),
                "duplicate attribute '{}'",
                def.key
            );
            bundle.attributes.push(def);
        }
        for def in skills {
            let key = def.key.clone();
            anyhow::ensure!(
                bundle.skills.insert(key.clone(), def).is_none(),
                "duplicate skill '{}'",
                key
            );
        }
        for def in classes.classes {
            let id = def.id.clone();
            anyhow::ensure!(
                bundle.classes.insert(id.clone(), def).is_none(),
                "duplicate class '{}'",
                id
            );
        }
        for settings in classes.groups {
            bundle.groups.insert(settings.group.clone(), settings);
        }

        bundle.validate()?;
        Ok(bundle)
    }

    /// Default data set compiled into the crate.
    pub fn embedded() -> LoadResult<Self> {
        Self::new(
            ConfigLoader::parse(EMBEDDED_CONFIG)?,
            AttributeLoader::parse(EMBEDDED_ATTRIBUTES)?,
            SkillLoader::parse(EMBEDDED_SKILLS)?,
            ClassLoader::parse(EMBEDDED_CLASSES)?,
        )
    }

    /// Checks that every cross-table reference resolves.
    pub fn validate(&self) -> LoadResult<()> {
        for class in self.classes.values() {
            for skill in &class.skills {
                anyhow::ensure!(
                    self.skills.contains_key(skill),
                    "class '{}' lists unknown skill '{}'",
                    class.id,
                    skill
                );
            }
            for attribute in class.attributes.keys() {
                anyhow::ensure!(
                    self.attribute(attribute).is_some(),
                    "class '{}' scales unknown attribute '{}'",
                    class.id,
                    attribute
                );
            }
            if let Some(parent) = &class.parent {
                anyhow::ensure!(
                    self.classes.contains_key(parent),
                    "class '{}' names unknown parent '{}'",
                    class.id,
                    parent
                );
            }
        }

        for skill in self.skills.values() {
            for requirement in &skill.requirements {
                match requirement {
                    Requirement::Skill { key, .. } => anyhow::ensure!(
                        self.skills.contains_key(key),
                        "skill '{}' requires unknown skill '{}'",
                        skill.key,
                        key
                    ),
                    Requirement::Attribute { key, .. } => anyhow::ensure!(
                        self.attribute(key).is_some(),
                        "skill '{}' requires unknown attribute '{}'",
                        skill.key,
                        key
                    ),
                    Requirement::ClassLevel(_) | Requirement::InvestedSkillPoints(_) => {}
                }
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn with_config(mut self, config: ProgressionConfig) -> Self {
        self.config = config;
        self
    }

    /// Engine view over these tables.
    pub fn env(&self) -> ProgressionEnv<'_> {
        ProgressionEnv::from_tables(self, &self.config)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.classes.values()
    }
}

impl AttributeOracle for ContentBundle {
    fn attribute(&self, key: &AttributeKey) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|def| &def.key == key)
    }

    fn attributes(&self) -> Vec<&AttributeDefinition> {
        self.attributes.iter().collect()
    }
}

impl SkillOracle for ContentBundle {
    fn skill(&self, key: &SkillKey) -> Option<&SkillDefinition> {
        self.skills.get(key)
    }

    fn skills(&self) -> Vec<&SkillDefinition> {
        self.skills.values().collect()
    }
}

impl ClassOracle for ContentBundle {
    fn class(&self, id: &ClassId) -> Option<&ClassDefinition> {
        self.classes.get(id)
    }

    fn group(&self, group: &ClassGroup) -> GroupSettings {
        self.groups
            .get(group)
            .cloned()
            .unwrap_or_else(|| GroupSettings::new(group.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_data_loads_and_resolves() {
        let bundle = ContentBundle::embedded();
        assert!(bundle.is_ok(), "{bundle:?}");
        let bundle = bundle.unwrap_or_default();

        assert!(bundle.class(&"mage".into()).is_some());
        assert!(bundle.skill(&"fireball".into()).is_some());
        assert!(bundle.attribute(&"vitality".into()).is_some());
        assert_eq!(bundle.group(&"class".into()).starting_points, 2);
    }

    #[test]
    fn unknown_group_falls_back_to_defaults() {
        let bundle = ContentBundle::default();

        assert_eq!(bundle.group(&"craft".into()), GroupSettings::new("craft"));
    }

    #[test]
    fn dangling_class_skill_is_rejected() {
        let mut mage = ClassDefinition::new("mage", "class", 10);
        mage.skills = vec!["fireball".into()];
        let catalog = ClassCatalog {
            groups: Vec::new(),
            classes: vec![mage],
        };

        let result = ContentBundle::new(ProgressionConfig::default(), Vec::new(), Vec::new(), catalog);

        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("unknown skill 'fireball'"));
    }

    #[test]
    fn duplicate_skills_are_rejected() {
        let skills = vec![
            SkillDefinition::new("heal", 3),
            SkillDefinition::new("HEAL", 5),
        ];

        let result = ContentBundle::new(
            ProgressionConfig::default(),
            Vec::new(),
            skills,
            ClassCatalog::default(),
        );

        assert!(result.is_err());
    }
}
