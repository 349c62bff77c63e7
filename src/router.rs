// src/router.rs - Assigns launcher/controller roles from handedness labels
use serde::Serialize;
use std::fmt;

use crate::landmarks::{Handedness, HandObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Left hand: opens applications.
    Launcher,
    /// Right hand: scrolls, confirms and drives playback.
    Controller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Launcher => "launcher",
            Self::Controller => "controller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAssignment<'a> {
    pub launcher: Option<&'a HandObservation>,
    pub controller: Option<&'a HandObservation>,
}

impl<'a> RoleAssignment<'a> {
    pub fn get(&self, role: Role) -> Option<&'a HandObservation> {
        match role {
            Role::Launcher => self.launcher,
            Role::Controller => self.controller,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.launcher.is_none() && self.controller.is_none()
    }
}

/// First Left-labelled hand becomes the launcher, first Right-labelled hand the
/// controller. Unknown labels never get a role.
pub fn route(hands: &[HandObservation]) -> RoleAssignment<'_> {
    RoleAssignment {
        launcher: hands.iter().find(|h| h.handedness == Handedness::Left),
        controller: hands.iter().find(|h| h.handedness == Handedness::Right),
    }
}
