// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity errors.

use crate::entity::EntityKind;
use thiserror::Error;

/// Errors raised when an entity and a pose do not fit together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// A pose of one entity kind was handed to another kind
    #[error("{state:?} state cannot be applied to a {entity:?} entity")]
    KindMismatch {
        /// Kind of the entity
        entity: EntityKind,
        /// Kind of the offending state
        state: EntityKind,
    },

    /// Stick-figure pose has the wrong number of joints
    #[error("Pose has {found} joints, figure has {expected}")]
    JointCountMismatch {
        /// Joints in the figure
        expected: usize,
        /// Joints in the pose
        found: usize,
    },

    /// A joint refers to a parent that does not precede it
    #[error("Invalid joint parent {parent} (only {joints} joints before it)")]
    InvalidJointParent {
        /// Requested parent index
        parent: usize,
        /// Number of joints available as parents
        joints: usize,
    },
}
