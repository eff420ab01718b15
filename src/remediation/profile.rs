//! Fixed per-category remediation profiles
//!
//! Cost factors scale the top hypothesis' workshop cost range. The workshop
//! factor is always 1.0.

use super::result::{Difficulty, PathKind};
use crate::catalog::Category;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProfile {
    pub kind: PathKind,
    pub cost_factor: f64,
    pub hours: (f64, f64),
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    pub diy: PathProfile,
    pub hybrid: PathProfile,
    pub workshop: PathProfile,
}

impl CategoryProfile {
    /// Paths in declaration order: DIY, Hybrid, Workshop
    pub fn paths(&self) -> [PathProfile; 3] {
        [self.diy, self.hybrid, self.workshop]
    }
}

fn path(
    kind: PathKind,
    cost_factor: f64,
    hours: (f64, f64),
    difficulty: Difficulty,
) -> PathProfile {
    PathProfile {
        kind,
        cost_factor,
        hours,
        difficulty,
    }
}

pub fn profile_for(category: Category) -> CategoryProfile {
    use Difficulty::*;
    use PathKind::*;

    match category {
        Category::Engine => CategoryProfile {
            diy: path(Diy, 0.45, (3.0, 8.0), Expert),
            hybrid: path(Hybrid, 0.75, (1.5, 4.0), Moderate),
            workshop: path(Workshop, 1.0, (1.0, 3.0), Easy),
        },
        Category::Brakes => CategoryProfile {
            diy: path(Diy, 0.4, (2.0, 4.0), Hard),
            hybrid: path(Hybrid, 0.7, (1.0, 2.0), Moderate),
            workshop: path(Workshop, 1.0, (1.0, 2.0), Easy),
        },
        Category::Electrical => CategoryProfile {
            diy: path(Diy, 0.5, (0.5, 2.0), Moderate),
            hybrid: path(Hybrid, 0.75, (0.5, 1.5), Easy),
            workshop: path(Workshop, 1.0, (0.5, 1.5), Easy),
        },
        Category::Suspension => CategoryProfile {
            diy: path(Diy, 0.45, (3.0, 6.0), Hard),
            hybrid: path(Hybrid, 0.7, (1.5, 3.0), Moderate),
            workshop: path(Workshop, 1.0, (1.5, 3.0), Easy),
        },
        Category::Climate => CategoryProfile {
            diy: path(Diy, 0.35, (1.0, 3.0), Moderate),
            hybrid: path(Hybrid, 0.65, (1.0, 2.0), Easy),
            workshop: path(Workshop, 1.0, (1.0, 2.5), Easy),
        },
    }
}
