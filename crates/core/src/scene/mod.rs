use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PopError, Result, Vec3};

/// Opaque identity of a target owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetHandle(pub u32);

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side view of the objects the scheduler animates. Positions and
/// visibility live in the host; the scheduler only reads and writes them.
pub trait TargetHost {
    fn contains(&self, target: TargetHandle) -> bool;

    fn position(&self, target: TargetHandle) -> Option<Vec3>;

    fn set_position(&mut self, target: TargetHandle, position: Vec3);

    fn set_active(&mut self, target: TargetHandle, active: bool);

    fn is_active(&self, target: TargetHandle) -> bool;
}

/// Serializable description of a target placed in a [`SceneGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub name: String,
    pub position: Vec3,
}

impl TargetDescriptor {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Square grid of `side * side` targets spaced `spacing` apart on the
    /// ground plane.
    pub fn grid(side: u32, spacing: f32) -> Vec<Self> {
        let mut targets = Vec::with_capacity((side * side) as usize);
        for row in 0..side {
            for col in 0..side {
                targets.push(Self::new(
                    format!("mole-{row}-{col}"),
                    Vec3::new(col as f32 * spacing, 0.0, row as f32 * spacing),
                ));
            }
        }
        targets
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub position: Vec3,
    pub active: bool,
}

/// In-memory [`TargetHost`] used by the command line driver and the tests.
/// Handles are indices into the object list.
#[derive(Debug, Default, Clone)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: &[TargetDescriptor]) -> Self {
        let mut scene = Self::new();
        for descriptor in descriptors {
            scene.spawn(descriptor.clone());
        }
        scene
    }

    /// Adds an inactive target at its rest position.
    pub fn spawn(&mut self, descriptor: TargetDescriptor) -> TargetHandle {
        let handle = TargetHandle(self.objects.len() as u32);
        self.objects.push(SceneObject {
            name: descriptor.name,
            position: descriptor.position,
            active: false,
        });
        handle
    }

    pub fn handles(&self) -> Vec<TargetHandle> {
        (0..self.objects.len() as u32).map(TargetHandle).collect()
    }

    pub fn object(&self, target: TargetHandle) -> Option<&SceneObject> {
        self.objects.get(target.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Moves a target as an external system would between cycles.
    pub fn move_target(&mut self, target: TargetHandle, position: Vec3) -> Result<()> {
        let object = self
            .objects
            .get_mut(target.0 as usize)
            .ok_or(PopError::UnknownTarget(target))?;
        object.position = position;
        Ok(())
    }
}

impl TargetHost for SceneGraph {
    fn contains(&self, target: TargetHandle) -> bool {
        (target.0 as usize) < self.objects.len()
    }

    fn position(&self, target: TargetHandle) -> Option<Vec3> {
        self.object(target).map(|object| object.position)
    }

    fn set_position(&mut self, target: TargetHandle, position: Vec3) {
        if let Some(object) = self.objects.get_mut(target.0 as usize) {
            object.position = position;
        }
    }

    fn set_active(&mut self, target: TargetHandle, active: bool) {
        if let Some(object) = self.objects.get_mut(target.0 as usize) {
            object.active = active;
        }
    }

    fn is_active(&self, target: TargetHandle) -> bool {
        self.object(target).map(|object| object.active).unwrap_or(false)
    }
}
