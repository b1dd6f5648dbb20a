use tracing::{debug, info, warn};

use super::{ProgressionEngine, ProgressionEvent};
use crate::env::ClassDefinition;
use crate::error::ProgressionError;
use crate::hook::Transaction;
use crate::modifier::StatBounds;
use crate::state::{ClassGroup, ClassId, ClassState, SkillState};
use crate::stats::StatKey;

impl<'a> ProgressionEngine<'a> {
    /// A root class may be professed into an empty group; a subclass only
    /// replaces its parent once the parent has reached its maximum level.
    pub fn can_profess(&self, id: &ClassId) -> Result<bool, ProgressionError> {
        let def = self.class_def(id)?;
        let Some(current) = self.progress.class(&def.group) else {
            return Ok(!def.has_parent());
        };
        if def.parent.as_ref() != Some(&current.class) {
            return Ok(false);
        }
        let at_max = self
            .env
            .classes
            .class(&current.class)
            .is_some_and(|parent| current.level >= parent.max_level);
        Ok(at_max)
    }

    /// Professes a class into its group.
    ///
    /// A fresh group starts from the group's starting points. A subclass
    /// either inherits the parent's level, experience and points or, when the
    /// group resets on profession, starts over with refunds per group settings.
    pub fn profess(&mut self, id: &ClassId) -> Result<(), ProgressionError> {
        let def = self.class_def(id)?;
        if !self.can_profess(id)? {
            return Err(ProgressionError::CannotProfess(id.clone()));
        }
        let group = def.group.clone();
        let previous = self.progress.class(&group).map(|state| state.class.clone());

        let transaction = Transaction::Profess {
            actor: self.actor,
            class: id.clone(),
            previous: previous.clone(),
        };
        if self.ports.hook.before_commit(&transaction).is_denied() {
            warn!(actor = %self.actor, class = %id, "profession vetoed");
            return Err(ProgressionError::Vetoed);
        }

        let settings = self.env.classes.group(&group);
        match previous {
            None => {
                self.progress
                    .classes
                    .insert(group.clone(), ClassState::new(id.clone(), settings.starting_points));
                self.progress.ledger.grant_points(settings.starting_attribute_points);
            }
            Some(_) if settings.profess_reset => {
                let refunded = self.drop_group_skills(&group, settings.refund_skills_on_reset);
                let attribute_credit = if settings.refund_attributes_on_reset {
                    self.progress.ledger.points()
                        + self
                            .progress
                            .ledger
                            .entries()
                            .map(|(_, entry)| entry.invested)
                            .sum::<i64>()
                } else {
                    0
                };
                let points = if refunded > 0 {
                    refunded
                } else {
                    settings.starting_points
                };
                self.progress
                    .classes
                    .insert(group.clone(), ClassState::new(id.clone(), points));
                self.progress.ledger.reset(self.attribute_allowance());
                self.progress.ledger.grant_points(attribute_credit);
            }
            Some(_) => {
                if let Some(state) = self.progress.classes.get_mut(&group) {
                    state.class = id.clone();
                }
            }
        }

        self.register_class_skills(def);
        self.record(ProgressionEvent::ClassProfessed {
            actor: self.actor,
            class: id.clone(),
            group: group.clone(),
        });
        info!(actor = %self.actor, class = %id, %group, "class professed");
        self.settle_auto_levels();
        self.recompute();
        Ok(())
    }

    /// Removes the class of `group` together with its skills and resets the
    /// attribute ledger.
    pub fn reset_class(&mut self, group: &ClassGroup) -> Result<(), ProgressionError> {
        if self.progress.classes.remove(group).is_none() {
            return Err(ProgressionError::GroupNotProfessed(group.clone()));
        }
        self.drop_group_skills(group, false);
        self.progress.ledger.reset(self.attribute_allowance());

        self.record(ProgressionEvent::ClassReset {
            actor: self.actor,
            group: group.clone(),
        });
        debug!(actor = %self.actor, %group, "class reset");
        self.recompute();
        Ok(())
    }

    pub fn reset_all_classes(&mut self) {
        let groups: Vec<_> = self.progress.classes.keys().cloned().collect();
        for group in &groups {
            // Each group was just listed, so the removal always succeeds.
            let _ = self.reset_class(group);
        }
    }

    /// Feeds experience to every professed class. Positive amounts are scaled
    /// through the experience stat. Returns the number of levels gained.
    pub fn give_exp(&mut self, amount: f64) -> i32 {
        if amount <= 0.0 || !self.progress.has_class() {
            return 0;
        }
        let scaled = self
            .pipeline()
            .scale_stat(StatKey::Experience, amount, StatBounds::NON_NEGATIVE);

        let groups: Vec<_> = self.progress.classes.keys().cloned().collect();
        let mut gained = 0;
        for group in &groups {
            gained += self.feed_exp(group, scaled);
        }
        if gained > 0 {
            self.settle_auto_levels();
            self.recompute();
        }
        gained
    }

    /// Raises every professed class by up to `amount` levels.
    pub fn give_levels(&mut self, amount: u32) -> i32 {
        let groups: Vec<_> = self.progress.classes.keys().cloned().collect();
        let mut gained = 0;
        for group in &groups {
            for _ in 0..amount {
                if !self.level_up(group) {
                    break;
                }
                gained += 1;
            }
            if let Some(state) = self.progress.classes.get_mut(group) {
                state.exp = 0.0;
            }
        }
        if gained > 0 {
            self.settle_auto_levels();
            self.recompute();
        }
        gained
    }

    /// Adds skill points to every professed class.
    pub fn give_points(&mut self, amount: i64) {
        for state in self.progress.classes.values_mut() {
            state.give_points(amount);
        }
    }

    pub fn set_points(&mut self, points: i64) {
        for state in self.progress.classes.values_mut() {
            state.points = points.max(0);
        }
    }

    fn class_def(&self, id: &ClassId) -> Result<&'a ClassDefinition, ProgressionError> {
        let classes = self.env.classes;
        classes
            .class(id)
            .ok_or_else(|| ProgressionError::UnknownClass(id.clone()))
    }

    /// Starting plus per-level attribute points of every professed class.
    pub(super) fn attribute_allowance(&self) -> i64 {
        let env = self.env;
        self.progress
            .classes
            .values()
            .filter_map(|state| {
                let def = env.classes.class(&state.class)?;
                let settings = env.classes.group(&def.group);
                Some(settings.starting_attribute_points + def.attribute_points_per_level * i64::from(state.level - 1))
            })
            .sum()
    }

    /// Registers every skill of `def` as locked under its group. Skills the
    /// actor already holds through a grant are adopted by the class.
    fn register_class_skills(&mut self, def: &ClassDefinition) {
        for key in &def.skills {
            let skill = self
                .progress
                .skills
                .entry(key.clone())
                .or_insert_with(|| SkillState::locked(key.clone(), Some(def.group.clone())));
            if skill.class.is_none() {
                skill.class = Some(def.group.clone());
            }
        }
    }

    /// Detaches every skill owned by `group`. Skills still held through a
    /// grant stay at their granted level. Returns the invested points when
    /// `refund` is set, zero otherwise.
    fn drop_group_skills(&mut self, group: &ClassGroup, refund: bool) -> i64 {
        let owned: Vec<_> = self
            .progress
            .skills
            .values()
            .filter(|skill| skill.class.as_ref() == Some(group))
            .map(|skill| skill.key.clone())
            .collect();

        let mut refunded = 0;
        for key in owned {
            let Some(mut skill) = self.progress.skills.remove(&key) else {
                continue;
            };
            if refund {
                refunded += skill.invested_cost;
            }
            if !skill.grants.is_empty() {
                skill.class = None;
                skill.invested_cost = 0;
                skill.funded_level = 0;
                skill.level = skill.max_grant();
                self.progress.skills.insert(key, skill);
            }
        }
        refunded
    }

    fn feed_exp(&mut self, group: &ClassGroup, amount: f64) -> i32 {
        let classes = self.env.classes;
        let Some(def) = self
            .progress
            .class(group)
            .and_then(|state| classes.class(&state.class))
        else {
            return 0;
        };
        let mut gained = 0;
        if let Some(state) = self.progress.classes.get_mut(group) {
            state.exp += amount;
        }
        loop {
            let Some(state) = self.progress.class(group) else {
                break;
            };
            if state.level >= def.max_level {
                if let Some(state) = self.progress.classes.get_mut(group) {
                    state.exp = 0.0;
                }
                break;
            }
            let required = def.required_exp(state.level);
            if state.exp < required {
                break;
            }
            if let Some(state) = self.progress.classes.get_mut(group) {
                state.exp -= required;
            }
            if !self.level_up(group) {
                break;
            }
            gained += 1;
        }
        gained
    }

    /// Raises one class level, granting the per-level skill and attribute
    /// points. False once the class sits at its maximum.
    fn level_up(&mut self, group: &ClassGroup) -> bool {
        let env = self.env;
        let Some(state) = self.progress.classes.get_mut(group) else {
            return false;
        };
        let Some(def) = env.classes.class(&state.class) else {
            return false;
        };
        if state.level >= def.max_level {
            return false;
        }
        state.level += 1;
        state.give_points(def.points_per_level);
        let level = state.level;
        self.progress.ledger.grant_points(def.attribute_points_per_level);

        self.record(ProgressionEvent::LevelUp {
            actor: self.actor,
            group: group.clone(),
            level,
        });
        debug!(actor = %self.actor, %group, level, "class level up");
        true
    }
}
