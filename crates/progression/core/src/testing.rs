//! In-memory oracles and host doubles shared by unit tests.

use std::collections::BTreeMap;

use crate::env::{
    AttributeDefinition, AttributeOracle, ClassDefinition, ClassOracle, GroupSettings,
    SkillDefinition, SkillOracle,
};
use crate::state::{AttributeKey, ClassGroup, ClassId, ResourcePool, SkillKey};
use crate::stats::{ActorAdapter, StatKey};

#[derive(Clone, Debug, Default)]
pub(crate) struct TestTables {
    attributes: Vec<AttributeDefinition>,
    skills: BTreeMap<SkillKey, SkillDefinition>,
    classes: BTreeMap<ClassId, ClassDefinition>,
    groups: BTreeMap<ClassGroup, GroupSettings>,
}

impl TestTables {
    pub(crate) fn with_attribute(mut self, def: AttributeDefinition) -> Self {
        self.attributes.push(def);
        self
    }

    pub(crate) fn with_skill(mut self, def: SkillDefinition) -> Self {
        self.skills.insert(def.key.clone(), def);
        self
    }

    pub(crate) fn with_class(mut self, def: ClassDefinition) -> Self {
        self.classes.insert(def.id.clone(), def);
        self
    }

    pub(crate) fn with_group(mut self, settings: GroupSettings) -> Self {
        self.groups.insert(settings.group.clone(), settings);
        self
    }
}

impl AttributeOracle for TestTables {
    fn attribute(&self, key: &AttributeKey) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|def| &def.key == key)
    }

    fn attributes(&self) -> Vec<&AttributeDefinition> {
        self.attributes.iter().collect()
    }
}

impl SkillOracle for TestTables {
    fn skill(&self, key: &SkillKey) -> Option<&SkillDefinition> {
        self.skills.get(key)
    }

    fn skills(&self) -> Vec<&SkillDefinition> {
        self.skills.values().collect()
    }
}

impl ClassOracle for TestTables {
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

/// Adapter recording every write in order.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingActor {
    pub(crate) stats: Vec<(StatKey, f64)>,
    pub(crate) pools: Vec<ResourcePool>,
}

impl RecordingActor {
    pub(crate) fn last(&self, stat: StatKey) -> Option<f64> {
        self.stats
            .iter()
            .rev()
            .find(|(written, _)| *written == stat)
            .map(|(_, value)| *value)
    }
}

impl ActorAdapter for RecordingActor {
    fn write_stat(&mut self, stat: StatKey, value: f64) {
        self.stats.push((stat, value));
    }

    fn write_resource_pool(&mut self, pool: ResourcePool) {
        self.pools.push(pool);
    }
}
