//! Well-known identifiers used when talking to the work item tracking API.
//!
//! Field paths are JSON-Patch pointers into a work item's `fields` bag and can
//! be passed straight to [`PatchOperation`](crate::patch::PatchOperation).

/// Field paths for the `System.*` fields every process template defines.
pub mod system_fields {
    pub const TITLE: &str = "/fields/System.Title";
    pub const DESCRIPTION: &str = "/fields/System.Description";

    pub const AREA_PATH: &str = "/fields/System.AreaPath";
    pub const TEAM_PROJECT: &str = "/fields/System.TeamProject";
    pub const ITERATION_PATH: &str = "/fields/System.IterationPath";

    pub const WORKITEM_TYPE: &str = "/fields/System.WorkItemType";
    pub const STATE: &str = "/fields/System.State";
    pub const REASON: &str = "/fields/System.Reason";

    pub const ASSIGNED_TO: &str = "/fields/System.AssignedTo";
    pub const CREATED_DATE: &str = "/fields/System.CreatedDate";
    pub const CREATED_BY: &str = "/fields/System.CreatedBy";
    pub const CHANGED_DATE: &str = "/fields/System.ChangedDate";
    pub const CHANGED_BY: &str = "/fields/System.ChangedBy";

    pub const TAGS: &str = "/fields/System.Tags";
    pub const HISTORY: &str = "/fields/System.History";
}

/// Field paths for the `Microsoft.VSTS.*` fields of the stock templates.
pub mod microsoft_fields {
    pub const VALUE_AREA: &str = "/fields/Microsoft.VSTS.Common.ValueArea";
    pub const PRIORITY: &str = "/fields/Microsoft.VSTS.Common.Priority";
    pub const REPRO_STEPS: &str = "/fields/Microsoft.VSTS.TCM.ReproSteps";
    pub const STORY_POINTS: &str = "/fields/Microsoft.VSTS.Scheduling.StoryPoints";
}

/// Pointer that appends to a work item's relation list.
pub const RELATIONS_APPEND: &str = "/relations/-";

/// Relation kinds accepted in a relation's `rel` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    /// The target is a child of the source.
    Child,
    /// The target is the parent of the source.
    Parent,
    Related,
    AttachedFile,
    Hyperlink,
}

impl LinkType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "System.LinkTypes.Hierarchy-Forward",
            Self::Parent => "System.LinkTypes.Hierarchy-Reverse",
            Self::Related => "System.LinkTypes.Related",
            Self::AttachedFile => "AttachedFile",
            Self::Hyperlink => "Hyperlink",
        }
    }
}

/// Process templates a new project can be created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessTemplate {
    Agile,
    #[default]
    Scrum,
    Cmmi,
}

impl ProcessTemplate {
    /// Returns the template type id the service expects.
    #[must_use]
    pub fn type_id(&self) -> &'static str {
        match self {
            Self::Agile => "adcc42ab-9882-485e-a3ed-7678f01f66bc",
            Self::Scrum => "6b724908-ef14-45cf-84f8-768b5384da45",
            Self::Cmmi => "27450541-8e31-4150-9947-dc59f998fc01",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceControlType {
    #[default]
    Git,
    Tfvc,
}

impl SourceControlType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "Git",
            Self::Tfvc => "Tfvc",
        }
    }
}

/// Project state filter for project listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    #[default]
    WellFormed,
    CreatePending,
    Deleting,
    New,
    All,
}

impl StateFilter {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WellFormed => "WellFormed",
            Self::CreatePending => "CreatePending",
            Self::Deleting => "Deleting",
            Self::New => "New",
            Self::All => "All",
        }
    }
}

/// Common `System.State` values.
pub mod state {
    pub const ACTIVE: &str = "Active";
    pub const CLOSED: &str = "Closed";
    pub const NEW: &str = "New";
    pub const REMOVED: &str = "Removed";
    pub const RESOLVED: &str = "Resolved";
}
