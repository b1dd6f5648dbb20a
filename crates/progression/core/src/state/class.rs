use super::ClassId;

/// Professed class of one class group.
///
/// `points` is the skill point budget consumed by skill upgrades of the
/// skills this class registered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassState {
    pub class: ClassId,
    pub level: i32,
    pub exp: f64,
    pub points: i64,
}

impl ClassState {
    pub fn new(class: ClassId, starting_points: i64) -> Self {
        Self {
            class,
            level: 1,
            exp: 0.0,
            points: starting_points.max(0),
        }
    }

    pub fn give_points(&mut self, amount: i64) {
        self.points = (self.points + amount).max(0);
    }

    pub fn use_points(&mut self, amount: i64) {
        self.points = (self.points - amount).max(0);
    }
}
