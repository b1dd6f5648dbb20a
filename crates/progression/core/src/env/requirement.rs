use crate::state::{AttributeKey, ClassGroup, SkillKey};

/// Read-only view of an actor's progression used by eligibility predicates.
pub trait ProgressionView {
    /// Level of the class professed in `group`.
    fn class_level(&self, group: &ClassGroup) -> Option<i32>;

    /// Highest level across every professed class, zero without classes.
    fn highest_class_level(&self) -> i32;

    fn skill_level(&self, skill: &SkillKey) -> i32;

    /// Effective attribute total (class base + stages + modifiers).
    fn attribute_total(&self, key: &AttributeKey) -> i32;

    fn invested_skill_points(&self) -> i64;
}

/// Eligibility predicate attached to a skill definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requirement {
    /// Owning class (or any class for class-less skills) at this level or above.
    ClassLevel(i32),
    /// Another skill at this level or above.
    Skill { key: SkillKey, level: i32 },
    /// Effective attribute total at this value or above.
    Attribute { key: AttributeKey, minimum: i32 },
    /// Total skill points invested across every skill.
    InvestedSkillPoints(i64),
}

impl Requirement {
    pub fn is_met(&self, view: &dyn ProgressionView, owner: Option<&ClassGroup>) -> bool {
        match self {
            Requirement::ClassLevel(level) => {
                let current = match owner {
                    Some(group) => view.class_level(group).unwrap_or(0),
                    None => view.highest_class_level(),
                };
                current >= *level
            }
            Requirement::Skill { key, level } => view.skill_level(key) >= *level,
            Requirement::Attribute { key, minimum } => view.attribute_total(key) >= *minimum,
            Requirement::InvestedSkillPoints(points) => view.invested_skill_points() >= *points,
        }
    }

    pub fn all_met<'r>(
        requirements: impl IntoIterator<Item = &'r Requirement>,
        view: &dyn ProgressionView,
        owner: Option<&ClassGroup>,
    ) -> bool {
        requirements.into_iter().all(|req| req.is_met(view, owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedView;

    impl ProgressionView for FixedView {
        fn class_level(&self, group: &ClassGroup) -> Option<i32> {
            (group.as_str() == "class").then_some(5)
        }

        fn highest_class_level(&self) -> i32 {
            5
        }

        fn skill_level(&self, skill: &SkillKey) -> i32 {
            if skill.as_str() == "spark" { 2 } else { 0 }
        }

        fn attribute_total(&self, key: &AttributeKey) -> i32 {
            if key.as_str() == "intelligence" { 7 } else { 0 }
        }

        fn invested_skill_points(&self) -> i64 {
            4
        }
    }

    #[test]
    fn predicates_read_the_view() {
        let class: ClassGroup = "class".into();
        let race: ClassGroup = "race".into();

        assert!(Requirement::ClassLevel(5).is_met(&FixedView, Some(&class)));
        assert!(!Requirement::ClassLevel(5).is_met(&FixedView, Some(&race)));
        assert!(Requirement::ClassLevel(5).is_met(&FixedView, None));
        assert!(
            Requirement::Skill {
                key: "spark".into(),
                level: 2
            }
            .is_met(&FixedView, None)
        );
        assert!(
            !Requirement::Attribute {
                key: "intelligence".into(),
                minimum: 8
            }
            .is_met(&FixedView, None)
        );
        assert!(Requirement::InvestedSkillPoints(4).is_met(&FixedView, None));
    }
}
