use papershelf_core::ReadingStatus;

/// Everything a key press or mouse event can ask the app to do.
///
/// Actions are context-free; `App::update` decides what each one means for
/// the focused pane and open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Tick,
    Resize(u16, u16),

    // Navigation
    MoveUp,
    MoveDown,
    GoTop,
    GoBottom,
    FocusNext,
    FocusPrev,
    Select,
    Back,
    NextTab,
    PrevTab,
    CloseTab,

    // Library
    ToggleFavourite,
    SetStatus(ReadingStatus),
    Delete,
    Confirm,
    EditCollections,
    NewCollection,
    ToggleItem,
    CycleSort,
    CycleViewMode,
    ToggleFavouritesOnly,
    StartSearch,
    AddPaper,
    Refresh,

    // PDF tab
    NextPage,
    PrevPage,
    Highlight,
    /// Left click at `(column, row)`.
    Click(u16, u16),

    // Panels
    ToggleChat,
    ToggleHelp,
    SaveConfig,

    // Text entry
    Input(char),
    Backspace,
    Submit,
    Cancel,
    NextField,
    PrevField,
    Extract,

    None,
}
