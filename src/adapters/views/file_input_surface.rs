use askama::Template;
use tracing::debug;

use crate::{
    application::selection::{units::format_megabytes, FileSelectionController},
    domain::{
        config::selection::PreviewMode,
        models::file::{FileCategory, RawFile, SelectedFile},
    },
};

const NAME_DISPLAY_LIMIT: usize = 40;

#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    pub preview_mode: PreviewMode,
    /// Disables click and key activation; dropped files are still handled.
    /// The rendered native input is then hidden and taken out of the tab order.
    pub prevent_open_file_dialog: bool,
    pub label: String,
    pub input_name: String,
    /// Upload endpoint; row removal posts to `{action}/{index}/remove`.
    pub action: String,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            preview_mode: PreviewMode::Default,
            prevent_open_file_dialog: false,
            label: "Upload files".to_string(),
            input_name: "files".to_string(),
            action: "/files".to_string(),
        }
    }
}

/// Events a surface reacts to. The HTTP routes only produce `Change` and
/// `Remove`; the activation and drag events exist for embedders that replay
/// client-side events into the surface (the drag state drives the
/// `file-input--dragging` class on the next render).
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    Click,
    KeyDown(String),
    DragEnter,
    DragLeave,
    Drop(Vec<RawFile>),
    Change(Vec<RawFile>),
    Remove(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEffect {
    None,
    OpenFileDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
    pub effect: SurfaceEffect,
    pub propagation_stopped: bool,
}

impl EventOutcome {
    fn effect(effect: SurfaceEffect) -> Self {
        Self {
            effect,
            propagation_stopped: false,
        }
    }

    fn contained() -> Self {
        Self {
            effect: SurfaceEffect::None,
            propagation_stopped: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub index: usize,
    pub icon: &'static str,
    pub name: String,
    pub display_name: String,
    pub size_label: String,
    pub remove_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverView<'a> {
    pub uri: &'a str,
    pub name: &'a str,
    pub overlay: Option<&'a str>,
    pub remove_action: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceView<'a> {
    Placeholder { children: Option<&'a str> },
    Cover(CoverView<'a>),
    List(Vec<FileRow>),
}

#[derive(Template)]
#[template(path = "file_input.html")]
struct FileInputTemplate<'a> {
    label: &'a str,
    mode: &'static str,
    input_id: String,
    input_name: &'a str,
    action: &'a str,
    accept: &'static str,
    multiple: bool,
    clickable: bool,
    dragging: bool,
    children: Option<&'a str>,
    cover: Option<CoverView<'a>>,
    rows: Vec<FileRow>,
    errors: &'a [String],
}

/// Binds user events to a [`FileSelectionController`] and renders its state.
/// The surface knows nothing about validation rules.
#[derive(Debug)]
pub struct FileInputSurface {
    controller: FileSelectionController,
    options: SurfaceOptions,
    children: Option<String>,
    overlay: Option<String>,
    cover_remove_action: String,
    dragging: bool,
}

impl FileInputSurface {
    pub fn new(controller: FileSelectionController, options: SurfaceOptions) -> Self {
        let cover_remove_action = remove_action(&options.action, 0);
        Self {
            controller,
            options,
            children: None,
            overlay: None,
            cover_remove_action,
            dragging: false,
        }
    }

    /// Markup shown instead of the default placeholder while nothing is selected.
    pub fn with_children(mut self, children: impl Into<String>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Markup layered over the cover image in `ImageCover` mode.
    pub fn with_overlay(mut self, overlay: impl Into<String>) -> Self {
        self.overlay = Some(overlay.into());
        self
    }

    pub fn controller(&self) -> &FileSelectionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FileSelectionController {
        &mut self.controller
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn dispatch(&mut self, event: SurfaceEvent) -> EventOutcome {
        match event {
            SurfaceEvent::Click => EventOutcome::effect(self.activation_effect()),
            SurfaceEvent::KeyDown(key) => match key.as_str() {
                "Enter" | " " | "Spacebar" => EventOutcome::effect(self.activation_effect()),
                _ => EventOutcome::effect(SurfaceEffect::None),
            },
            SurfaceEvent::DragEnter => {
                self.dragging = true;
                EventOutcome::effect(SurfaceEffect::None)
            }
            SurfaceEvent::DragLeave => {
                self.dragging = false;
                EventOutcome::effect(SurfaceEffect::None)
            }
            SurfaceEvent::Drop(files) => {
                self.dragging = false;
                debug!("{} files dropped", files.len());
                self.controller.handle_files(files);
                EventOutcome::effect(SurfaceEffect::None)
            }
            SurfaceEvent::Change(files) => {
                debug!("{} files picked", files.len());
                self.controller.handle_files(files);
                EventOutcome::effect(SurfaceEffect::None)
            }
            SurfaceEvent::Remove(index) => {
                self.controller.remove_file(index);
                EventOutcome::contained()
            }
        }
    }

    pub fn view(&self) -> SurfaceView<'_> {
        let files = self.controller.files();

        if files.is_empty() {
            return SurfaceView::Placeholder {
                children: self.children.as_deref(),
            };
        }

        if self.options.preview_mode == PreviewMode::ImageCover {
            if let [only] = files {
                if let (FileCategory::Image, Some(uri)) = (only.category(), only.preview_uri()) {
                    return SurfaceView::Cover(CoverView {
                        uri,
                        name: only.name(),
                        overlay: self.overlay.as_deref(),
                        remove_action: &self.cover_remove_action,
                    });
                }
            }
        }

        SurfaceView::List(
            files
                .iter()
                .enumerate()
                .map(|(index, file)| self.row(index, file))
                .collect(),
        )
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        let (children, cover, rows) = match self.view() {
            SurfaceView::Placeholder { children } => (children, None, Vec::new()),
            SurfaceView::Cover(cover) => (None, Some(cover), Vec::new()),
            SurfaceView::List(rows) => (None, None, rows),
        };

        let accepted_type = self.controller.options().accepted_type;
        FileInputTemplate {
            label: &self.options.label,
            mode: match self.options.preview_mode {
                PreviewMode::Default => "default",
                PreviewMode::ImageCover => "image-cover",
            },
            input_id: format!("file-input-{}", self.options.input_name),
            input_name: &self.options.input_name,
            action: &self.options.action,
            accept: accepted_type.accept_attribute(),
            multiple: self.controller.options().max_files > 1,
            clickable: !self.options.prevent_open_file_dialog,
            dragging: self.dragging,
            children,
            cover,
            rows,
            errors: self.controller.errors(),
        }
        .render()
    }

    fn activation_effect(&self) -> SurfaceEffect {
        if self.options.prevent_open_file_dialog {
            SurfaceEffect::None
        } else {
            SurfaceEffect::OpenFileDialog
        }
    }

    fn row(&self, index: usize, file: &SelectedFile) -> FileRow {
        FileRow {
            index,
            icon: file.category().icon(),
            name: file.name().to_string(),
            display_name: truncate_name(file.name()),
            size_label: format_megabytes(file.size()),
            remove_action: remove_action(&self.options.action, index),
        }
    }
}

fn remove_action(action: &str, index: usize) -> String {
    format!("{}/{}/remove", action.trim_end_matches('/'), index)
}

/// First 40 characters, followed by an ellipsis when the name is longer.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_DISPLAY_LIMIT {
        let mut truncated: String = name.chars().take(NAME_DISPLAY_LIMIT).collect();
        truncated.push_str("...");
        truncated
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::{
        domain::config::selection::SelectionOptions, services::MemoryPreviewStore,
    };

    fn surface(max_files: usize, options: SurfaceOptions) -> FileInputSurface {
        let previews = Arc::new(MemoryPreviewStore::new("/previews"));
        let controller = FileSelectionController::new(
            SelectionOptions {
                max_files,
                max_size: 1024,
                ..Default::default()
            },
            previews,
        );
        FileInputSurface::new(controller, options)
    }

    fn image(name: &str) -> RawFile {
        RawFile::new(name, "image/png", Bytes::from_static(b"png"))
    }

    #[test]
    fn click_and_activation_keys_open_the_dialog() {
        let mut surface = surface(1, SurfaceOptions::default());

        assert_eq!(
            surface.dispatch(SurfaceEvent::Click).effect,
            SurfaceEffect::OpenFileDialog
        );
        assert_eq!(
            surface.dispatch(SurfaceEvent::KeyDown("Enter".into())).effect,
            SurfaceEffect::OpenFileDialog
        );
        assert_eq!(
            surface.dispatch(SurfaceEvent::KeyDown(" ".into())).effect,
            SurfaceEffect::OpenFileDialog
        );
        assert_eq!(
            surface.dispatch(SurfaceEvent::KeyDown("a".into())).effect,
            SurfaceEffect::None
        );
    }

    #[test]
    fn suppressed_dialog_still_accepts_drops() {
        let mut surface = surface(
            1,
            SurfaceOptions {
                prevent_open_file_dialog: true,
                ..Default::default()
            },
        );

        assert_eq!(surface.dispatch(SurfaceEvent::Click).effect, SurfaceEffect::None);

        surface.dispatch(SurfaceEvent::DragEnter);
        assert!(surface.is_dragging());
        surface.dispatch(SurfaceEvent::Drop(vec![image("pie.png")]));

        assert!(!surface.is_dragging());
        assert_eq!(surface.controller().files().len(), 1);
    }

    #[test]
    fn remove_is_contained_and_never_opens_the_dialog() {
        let mut surface = surface(3, SurfaceOptions::default());
        surface.dispatch(SurfaceEvent::Change(vec![image("a.png"), image("b.png")]));

        let outcome = surface.dispatch(SurfaceEvent::Remove(0));

        assert_eq!(
            outcome,
            EventOutcome {
                effect: SurfaceEffect::None,
                propagation_stopped: true,
            }
        );
        assert_eq!(surface.controller().files()[0].name(), "b.png");
    }

    #[test]
    fn empty_selection_shows_children_when_given() {
        let plain = surface(1, SurfaceOptions::default());
        assert_eq!(plain.view(), SurfaceView::Placeholder { children: None });

        let custom = surface(1, SurfaceOptions::default()).with_children("<em>Pick one</em>");
        assert_eq!(
            custom.view(),
            SurfaceView::Placeholder {
                children: Some("<em>Pick one</em>")
            }
        );
        assert!(custom.render().unwrap().contains("<em>Pick one</em>"));
    }

    #[test]
    fn cover_mode_with_one_image_shows_the_cover() {
        let mut surface = surface(
            1,
            SurfaceOptions {
                preview_mode: PreviewMode::ImageCover,
                action: "/meals/share/files".into(),
                ..Default::default()
            },
        )
        .with_overlay("<span>Change</span>");
        surface.dispatch(SurfaceEvent::Change(vec![image("pie.png")]));

        let uri = surface.controller().files()[0].preview_uri().unwrap().to_string();
        match surface.view() {
            SurfaceView::Cover(cover) => {
                assert_eq!(cover.uri, uri);
                assert_eq!(cover.name, "pie.png");
                assert_eq!(cover.overlay, Some("<span>Change</span>"));
                assert_eq!(cover.remove_action, "/meals/share/files/0/remove");
            }
            other => panic!("expected cover, got {other:?}"),
        }

        let html = surface.render().unwrap();
        assert!(html.contains(&format!("src=\"{uri}\"")));
        assert!(html.contains("<span>Change</span>"));
    }

    #[test]
    fn cover_mode_with_several_files_falls_back_to_rows() {
        let mut surface = surface(
            3,
            SurfaceOptions {
                preview_mode: PreviewMode::ImageCover,
                ..Default::default()
            },
        );
        surface.dispatch(SurfaceEvent::Change(vec![image("a.png"), image("b.png")]));

        match surface.view() {
            SurfaceView::List(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1].remove_action, "/files/1/remove");
                assert_eq!(rows[0].icon, "icon-image");
                assert_eq!(rows[0].size_label, "0.00 MB");
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn adopted_current_files_show_up_as_rows() {
        let mut surface = surface(3, SurfaceOptions::default());
        surface
            .controller_mut()
            .set_current_files(vec![image("a.png"), image("b.png")]);
        assert!(surface.controller().is_empty());

        assert!(surface.controller_mut().adopt_current_files());
        match surface.view() {
            SurfaceView::List(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn long_names_are_truncated_to_forty_characters() {
        let long = "a".repeat(45);
        assert_eq!(truncate_name(&long), format!("{}...", "a".repeat(40)));
        assert_eq!(truncate_name(&"b".repeat(40)), "b".repeat(40));
        assert_eq!(truncate_name("ü".repeat(41).as_str()).chars().count(), 43);
    }

    #[test]
    fn render_forwards_label_and_escapes_names() {
        let mut surface = surface(
            3,
            SurfaceOptions {
                label: "Meal image".into(),
                ..Default::default()
            },
        );
        surface.dispatch(SurfaceEvent::Change(vec![image("<b>.png")]));

        let html = surface.render().unwrap();
        assert!(html.contains("aria-label=\"Meal image\""));
        assert!(html.contains("accept=\"image/*\""));
        assert!(html.contains(" multiple"));
        assert!(html.contains("&lt;b&gt;.png"));
        assert!(!html.contains("<b>.png"));
    }

    #[test]
    fn suppressed_dialog_hides_the_native_input() {
        let surface = surface(
            1,
            SurfaceOptions {
                prevent_open_file_dialog: true,
                ..Default::default()
            },
        );

        let html = surface.render().unwrap();
        let input = html
            .split("<input")
            .nth(1)
            .and_then(|rest| rest.split('>').next())
            .unwrap();
        assert!(input.contains(" hidden"));
        assert!(input.contains("tabindex=\"-1\""));
        assert!(!html.contains("<label"));
        assert!(!html.contains("click to browse"));
    }

    #[test]
    fn default_surface_keeps_the_native_input_reachable() {
        let html = surface(1, SurfaceOptions::default()).render().unwrap();
        let input = html
            .split("<input")
            .nth(1)
            .and_then(|rest| rest.split('>').next())
            .unwrap();
        assert!(!input.contains(" hidden"));
        assert!(!input.contains("tabindex"));
        assert!(html.contains("<label"));
    }

    #[test]
    fn drag_state_is_reflected_in_the_markup() {
        let mut surface = surface(1, SurfaceOptions::default());
        assert!(!surface.render().unwrap().contains("file-input--dragging"));

        surface.dispatch(SurfaceEvent::DragEnter);
        assert!(surface.render().unwrap().contains("file-input--dragging"));

        surface.dispatch(SurfaceEvent::DragLeave);
        assert!(!surface.render().unwrap().contains("file-input--dragging"));
    }

    #[test]
    fn render_lists_errors_from_the_last_pass() {
        let mut surface = surface(1, SurfaceOptions::default());
        surface.dispatch(SurfaceEvent::Drop(vec![RawFile::new(
            "clip.mp4",
            "video/mp4",
            Bytes::from_static(b"mp4"),
        )]));

        let html = surface.render().unwrap();
        assert!(html.contains("is not accepted"));
        assert!(html.contains("role=\"alert\""));
    }
}
