//! The four fixed life stages that drive prompt generation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub name: &'static str,
    pub age_range: &'static str,
}

pub const STAGES: [Stage; 4] = [
    Stage {
        name: "childhood",
        age_range: "ages 0-12",
    },
    Stage {
        name: "adolescence",
        age_range: "ages 13-24",
    },
    Stage {
        name: "youth",
        age_range: "ages 25-36",
    },
    Stage {
        name: "middle age",
        age_range: "ages 37-50",
    },
];

pub fn stage(index: usize) -> Option<&'static Stage> {
    STAGES.get(index)
}
