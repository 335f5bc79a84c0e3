/// Bullet ↔ plane hit test.
///
/// The plane's hit-box is an axis-aligned rectangle centred on the pose and
/// scaled with it.  Instead of shrinking bullets to points the box is grown
/// by the bullet radius.  At most one hit is resolved per frame: the first
/// matching bullet (oldest first) wins and the rest fly on.

use std::collections::VecDeque;

use crate::config::PlaneConfig;
use crate::entities::{Bullet, PlaneHealth, PlanePose};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitBox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl HitBox {
    pub fn for_plane(pose: &PlanePose, cfg: &PlaneConfig, inflate: f32) -> Self {
        let half_w = cfg.collision_width * pose.scale / 2.0 + inflate;
        let half_h = cfg.collision_height * pose.scale / 2.0 + inflate;
        Self {
            left: pose.x - half_w,
            right: pose.x + half_w,
            top: pose.y - half_h,
            bottom: pose.y + half_h,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Where a bullet struck the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub bullet_id: u64,
    pub x: f32,
    pub y: f32,
}

/// Find the first bullet inside the plane's hit-box and take it out of the
/// live set.  Returns `None` without looking if the plane is down.
pub fn detect(
    bullets: &mut VecDeque<Bullet>,
    pose: &PlanePose,
    health: &PlaneHealth,
    cfg: &PlaneConfig,
    bullet_radius: f32,
) -> Option<Hit> {
    if !health.alive {
        return None;
    }
    let hitbox = HitBox::for_plane(pose, cfg, bullet_radius);
    let idx = bullets.iter().position(|b| hitbox.contains(b.x, b.y))?;
    let bullet = bullets.remove(idx)?;
    Some(Hit {
        bullet_id: bullet.id,
        x: bullet.x,
        y: bullet.y,
    })
}
