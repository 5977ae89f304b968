use serde::{Deserialize, Serialize};

/// Hours logged on one cell. Whole hours; direct input clamps, other paths do not.
pub type Hours = i64;

/// Remote project identifier. `None` is the default "ordinary hours" project.
pub type ProjectId = Option<String>;

/// Column offset into the displayed month's day sequence.
pub type ColIndex = usize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            archived: false,
        }
    }

    /// The project every fresh install starts with.
    pub fn default_project() -> Self {
        Self {
            id: None,
            name: "Ordinary hours".to_string(),
            archived: false,
        }
    }
}

/// Keyboard focus / selection corner: stable project id plus a column offset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub project: ProjectId,
    pub col: ColIndex,
}

impl CellPos {
    pub fn new(project: ProjectId, col: ColIndex) -> Self {
        Self { project, col }
    }
}

/// Anchor (`start`) and moving corner (`end`). Never normalized on write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: CellPos,
    pub end: CellPos,
}

impl Selection {
    pub fn single(pos: CellPos) -> Self {
        Self {
            start: pos.clone(),
            end: pos,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (row delta, column delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// One cell mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub project: ProjectId,
    pub col: ColIndex,
    pub previous: Hours,
    pub next: Hours,
}

/// Changes applied and undone together, in collection (row-major) order.
pub type ChangeSet = Vec<Change>;

/// Local-only day annotation, never sent to the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbsenceKind {
    Sick,
    ChildCare,
    Vacation,
    Unpaid,
}

impl AbsenceKind {
    pub fn label(self) -> &'static str {
        match self {
            AbsenceKind::Sick => "sick",
            AbsenceKind::ChildCare => "child-care",
            AbsenceKind::Vacation => "vacation",
            AbsenceKind::Unpaid => "unpaid",
        }
    }

    /// Single-glyph marker for the calendar absence row.
    pub fn symbol(self) -> &'static str {
        match self {
            AbsenceKind::Sick => "S",
            AbsenceKind::ChildCare => "C",
            AbsenceKind::Vacation => "V",
            AbsenceKind::Unpaid => "U",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sick" => Some(AbsenceKind::Sick),
            "child-care" | "childcare" => Some(AbsenceKind::ChildCare),
            "vacation" => Some(AbsenceKind::Vacation),
            "unpaid" => Some(AbsenceKind::Unpaid),
            _ => None,
        }
    }
}

/// Display name for a project id, `default` for the sentinel.
pub fn project_label(id: &ProjectId) -> &str {
    id.as_deref().unwrap_or("default")
}
