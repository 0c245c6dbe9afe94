//! Single-shot hoop placement on a tracked ground plane

use glam::{Vec2, Vec3};

use super::events::{EventBus, GameEvent};
use crate::platform::{CameraPose, HoopHandle, HoopSpawner, PlaneRaycaster};
use crate::yaw_facing;

/// Places at most one hoop until it is explicitly removed
#[derive(Debug, Clone)]
pub struct HoopPlacement {
    offset: Vec3,
    hoop: Option<HoopHandle>,
    position: Option<Vec3>,
}

impl HoopPlacement {
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            hoop: None,
            position: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.hoop.is_some()
    }

    pub fn hoop(&self) -> Option<HoopHandle> {
        self.hoop
    }

    /// World position of the placed hoop
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    /// Try to place the hoop from a touch-begin.
    ///
    /// Does nothing (not even a raycast) while a hoop exists. Only hits inside
    /// a tracked plane's polygon count.
    pub fn try_place(
        &mut self,
        screen_pos: Vec2,
        raycaster: &mut dyn PlaneRaycaster,
        camera: &CameraPose,
        spawner: &mut dyn HoopSpawner,
        events: &mut EventBus,
    ) -> Option<HoopHandle> {
        if self.is_placed() {
            return None;
        }

        let hit = raycaster.raycast(screen_pos)?;
        if !hit.within_polygon {
            log::debug!("Plane hit outside polygon bounds, ignoring");
            return None;
        }

        let position = hit.position + self.offset;
        let rotation = yaw_facing(position, camera.position);
        let handle = spawner.spawn(position, rotation);

        self.hoop = Some(handle);
        self.position = Some(position);
        log::info!(
            "Hoop placed at ({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
        events.emit(GameEvent::HoopPlaced { position });
        Some(handle)
    }

    /// Destroy the hoop and allow placing a new one.
    /// Returns false if there was nothing to remove.
    pub fn remove(&mut self, spawner: &mut dyn HoopSpawner, events: &mut EventBus) -> bool {
        let Some(handle) = self.hoop.take() else {
            return false;
        };
        spawner.despawn(handle);
        self.position = None;
        log::info!("Hoop removed");
        events.emit(GameEvent::HoopRemoved);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlaneHit;
    use crate::platform::headless::{HeadlessHoops, HeadlessRaycaster};

    fn ground_hit(position: Vec3) -> Option<PlaneHit> {
        Some(PlaneHit {
            position,
            within_polygon: true,
        })
    }

    #[test]
    fn test_places_with_offset_facing_camera() {
        let mut raycaster = HeadlessRaycaster::default();
        let mut hoops = HeadlessHoops::default();
        let mut bus = EventBus::new();
        raycaster.set_hit(ground_hit(Vec3::new(0.0, -1.5, -3.0)));

        let camera = CameraPose::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let mut placement = HoopPlacement::new(Vec3::new(0.0, 0.5, 0.0));
        let handle = placement
            .try_place(Vec2::new(200.0, 400.0), &mut raycaster, &camera, &mut hoops, &mut bus)
            .unwrap();

        let live = hoops.live();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].handle, handle);
        assert_eq!(live[0].position, Vec3::new(0.0, -1.0, -3.0));

        // Faces the camera on the horizontal plane only
        let facing = live[0].rotation * Vec3::NEG_Z;
        assert!(facing.y.abs() < 1e-6);
        assert!((facing - Vec3::Z).length() < 1e-5);

        assert_eq!(
            bus.pop(),
            Some(GameEvent::HoopPlaced {
                position: Vec3::new(0.0, -1.0, -3.0)
            })
        );
    }

    #[test]
    fn test_placement_is_idempotent() {
        let mut raycaster = HeadlessRaycaster::default();
        let mut hoops = HeadlessHoops::default();
        let mut bus = EventBus::new();
        raycaster.set_hit(ground_hit(Vec3::new(1.0, 0.0, -2.0)));
        let camera = CameraPose::default();
        let mut placement = HoopPlacement::new(Vec3::ZERO);

        assert!(placement
            .try_place(Vec2::ZERO, &mut raycaster, &camera, &mut hoops, &mut bus)
            .is_some());
        for _ in 0..5 {
            assert!(placement
                .try_place(Vec2::ONE, &mut raycaster, &camera, &mut hoops, &mut bus)
                .is_none());
        }

        assert_eq!(hoops.spawned_total(), 1);
        assert_eq!(raycaster.casts(), 1);
    }

    #[test]
    fn test_rejects_miss_and_out_of_polygon() {
        let mut raycaster = HeadlessRaycaster::default();
        let mut hoops = HeadlessHoops::default();
        let mut bus = EventBus::new();
        let camera = CameraPose::default();
        let mut placement = HoopPlacement::new(Vec3::ZERO);

        assert!(placement
            .try_place(Vec2::ZERO, &mut raycaster, &camera, &mut hoops, &mut bus)
            .is_none());

        raycaster.set_hit(Some(PlaneHit {
            position: Vec3::new(0.0, 0.0, -2.0),
            within_polygon: false,
        }));
        assert!(placement
            .try_place(Vec2::ZERO, &mut raycaster, &camera, &mut hoops, &mut bus)
            .is_none());

        assert!(!placement.is_placed());
        assert_eq!(hoops.spawned_total(), 0);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_remove_reenables_placement() {
        let mut raycaster = HeadlessRaycaster::default();
        let mut hoops = HeadlessHoops::default();
        let mut bus = EventBus::new();
        raycaster.set_hit(ground_hit(Vec3::new(0.0, 0.0, -2.0)));
        let camera = CameraPose::default();
        let mut placement = HoopPlacement::new(Vec3::ZERO);

        assert!(!placement.remove(&mut hoops, &mut bus));

        placement.try_place(Vec2::ZERO, &mut raycaster, &camera, &mut hoops, &mut bus);
        assert!(placement.remove(&mut hoops, &mut bus));
        assert!(!placement.is_placed());
        assert!(hoops.live().is_empty());

        placement.try_place(Vec2::ZERO, &mut raycaster, &camera, &mut hoops, &mut bus);
        assert!(placement.is_placed());
        assert_eq!(hoops.live().len(), 1);
        assert_eq!(hoops.spawned_total(), 2);
    }
}
