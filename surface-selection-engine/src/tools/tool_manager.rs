use crate::tools::gesture::GestureMode;
use crate::tools::surface_select::{SelectionCleared, SelectionSession};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Enumeration of available selection tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Lasso,
    Circle,
}

impl ToolType {
    /// Parse a host-supplied tool identifier.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lasso" | "polygon" => Some(Self::Lasso),
            "circle" => Some(Self::Circle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lasso => "lasso",
            Self::Circle => "circle",
        }
    }

    pub fn gesture_mode(&self) -> GestureMode {
        match self {
            Self::Lasso => GestureMode::Lasso,
            Self::Circle => GestureMode::Circle,
        }
    }
}

/// Resource tracking the currently active tool. Only one tool is active at a time.
#[derive(Resource, Default)]
pub struct ToolManager {
    active_tool: Option<ToolType>,
}

impl ToolManager {
    /// Activate specified tool. Returns `false` when it was already active.
    pub fn activate_tool(&mut self, tool_type: ToolType) -> bool {
        if self.active_tool == Some(tool_type) {
            return false;
        }
        self.active_tool = Some(tool_type);
        info!("Tool manager activated: {}", tool_type.as_str());
        true
    }

    pub fn deactivate_current_tool(&mut self) -> Option<ToolType> {
        let previous = self.active_tool.take();
        if let Some(tool) = previous {
            info!("Tool manager deactivated: {}", tool.as_str());
        }
        previous
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    pub fn is_tool_active(&self, tool_type: ToolType) -> bool {
        self.active_tool == Some(tool_type)
    }
}

/// Fired when tool selection changes via keyboard shortcuts or the host application.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToolSelectionEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Deactivates the current tool and discards any selection state.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ClearToolEvent;

/// Source of tool selection for debugging and conditional logic.
#[derive(Debug, Clone, Copy)]
pub enum ToolSelectionSource {
    Host,
    Keyboard,
}

pub fn handle_tool_selection_events(
    mut events: EventReader<ToolSelectionEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut session: ResMut<SelectionSession>,
    mut cleared: EventWriter<SelectionCleared>,
) {
    for event in events.read() {
        if !tool_manager.activate_tool(event.tool_type) {
            continue;
        }

        // Switching tools discards the previous selection.
        if session.reset() {
            cleared.write(SelectionCleared);
        }
        session.capture.set_mode(event.tool_type.gesture_mode());
        session.capture.set_enabled(true);
        info!("{} selection tool activated via {:?}", event.tool_type.as_str(), event.source);
    }
}

pub fn handle_clear_tool_events(
    mut events: EventReader<ClearToolEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut session: ResMut<SelectionSession>,
    mut cleared: EventWriter<SelectionCleared>,
) {
    if events.read().count() == 0 {
        return;
    }
    tool_manager.deactivate_current_tool();
    session.capture.set_enabled(false);
    if session.reset() {
        cleared.write(SelectionCleared);
    }
}

/// Keyboard shortcuts for tool selection (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool_events: EventWriter<ToolSelectionEvent>,
    mut clear_events: EventWriter<ClearToolEvent>,
) {
    for (key, tool_type) in [(KeyCode::KeyL, ToolType::Lasso), (KeyCode::KeyC, ToolType::Circle)] {
        if keyboard.just_pressed(key) {
            tool_events.write(ToolSelectionEvent {
                tool_type,
                source: ToolSelectionSource::Keyboard,
            });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyX) {
        clear_events.write(ClearToolEvent);
    }
}

/// No keyboard shortcuts in web builds; the host page drives tool selection.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::selection_config::CaptureSettings;
    use crate::engine::selection::shape::{SelectionShape, Viewport};
    use crate::engine::selection::summary::RegionSummary;

    fn tool_app() -> App {
        let mut app = App::new();
        app.insert_resource(SelectionSession::new(CaptureSettings::default()))
            .init_resource::<ToolManager>()
            .add_event::<ToolSelectionEvent>()
            .add_event::<ClearToolEvent>()
            .add_event::<SelectionCleared>()
            .add_systems(
                Update,
                (handle_tool_selection_events, handle_clear_tool_events).chain(),
            );
        app
    }

    fn pending_clears(app: &App) -> usize {
        app.world().resource::<Events<SelectionCleared>>().len()
    }

    #[test]
    fn test_activation_is_exclusive_and_idempotent() {
        let mut manager = ToolManager::default();
        assert!(manager.activate_tool(ToolType::Lasso));
        assert!(!manager.activate_tool(ToolType::Lasso));
        assert!(manager.activate_tool(ToolType::Circle));
        assert!(!manager.is_tool_active(ToolType::Lasso));
        assert_eq!(manager.deactivate_current_tool(), Some(ToolType::Circle));
        assert_eq!(manager.active_tool(), None);
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in [ToolType::Lasso, ToolType::Circle] {
            assert_eq!(ToolType::from_string(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolType::from_string("POLYGON"), Some(ToolType::Lasso));
        assert_eq!(ToolType::from_string("measure"), None);
    }

    #[test]
    fn test_selecting_a_tool_enables_capture_and_drops_selection() {
        let mut app = tool_app();
        let shape =
            SelectionShape::circle(Vec2::new(50.0, 50.0), 10.0, Viewport::new(100.0, 100.0)).unwrap();
        app.world_mut().resource_mut::<SelectionSession>().last_summary =
            Some(RegionSummary::empty(shape, None));

        app.world_mut().send_event(ToolSelectionEvent {
            tool_type: ToolType::Circle,
            source: ToolSelectionSource::Host,
        });
        app.update();

        let session = app.world().resource::<SelectionSession>();
        assert!(session.capture.is_enabled());
        assert_eq!(session.capture.mode(), GestureMode::Circle);
        assert!(session.last_summary.is_none());
        assert_eq!(pending_clears(&app), 1);
    }

    #[test]
    fn test_clear_event_disables_capture() {
        let mut app = tool_app();
        app.world_mut().send_event(ToolSelectionEvent {
            tool_type: ToolType::Lasso,
            source: ToolSelectionSource::Keyboard,
        });
        app.update();
        app.world_mut().send_event(ClearToolEvent);
        app.update();

        assert_eq!(app.world().resource::<ToolManager>().active_tool(), None);
        assert!(!app.world().resource::<SelectionSession>().capture.is_enabled());
    }
}
