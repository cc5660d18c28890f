use std::{fmt, sync::Arc};

use tracing::{debug, warn};

use crate::{
    application::{
        selection::{error::SelectionError, units::format_limit},
        services::PreviewService,
    },
    domain::{
        config::selection::SelectionOptions,
        models::file::{FileCategory, RawFile, SelectedFile},
    },
};

type FilesCallback = Box<dyn FnMut(&[SelectedFile]) + Send>;

/// Owns the selected files of one input, validates new candidates and
/// manages the preview handles of accepted images.
///
/// Every preview handle the controller allocates is revoked exactly once:
/// when its entry is removed or replaced, or when the controller is dropped.
pub struct FileSelectionController {
    options: SelectionOptions,
    previews: Arc<dyn PreviewService>,
    files: Vec<SelectedFile>,
    errors: Vec<String>,
    pending_current_files: Option<Vec<RawFile>>,
    on_files_changed: Option<FilesCallback>,
    on_files_rejected: Option<FilesCallback>,
}

impl FileSelectionController {
    pub fn new(options: SelectionOptions, previews: Arc<dyn PreviewService>) -> Self {
        let mut options = options;
        options.sanitize();

        Self {
            options,
            previews,
            files: Vec::new(),
            errors: Vec::new(),
            pending_current_files: None,
            on_files_changed: None,
            on_files_rejected: None,
        }
    }

    pub fn on_files_changed<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[SelectedFile]) + Send + 'static,
    {
        self.on_files_changed = Some(Box::new(callback));
        self
    }

    pub fn on_files_rejected<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[SelectedFile]) + Send + 'static,
    {
        self.on_files_rejected = Some(Box::new(callback));
        self
    }

    /// Seeds the selection immediately, without notifying `on_files_changed`.
    pub fn with_current_files(mut self, files: Vec<RawFile>) -> Self {
        self.replace_files(files);
        self
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn handle_files(&mut self, candidates: Vec<RawFile>) {
        self.errors.clear();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for candidate in candidates {
            match self.validate(&candidate) {
                Ok(()) => accepted.push(candidate),
                Err(e) => {
                    warn!("Rejected file {}: {}", candidate.name, e);
                    let reason = e.to_string();
                    self.errors.push(reason.clone());
                    rejected.push(SelectedFile::rejected(candidate, reason));
                }
            }
        }

        let added = if accepted.is_empty() {
            false
        } else if self.options.max_files == 1 {
            self.replace_single(accepted);
            true
        } else {
            self.append_within_room(accepted)
        };

        if added {
            self.notify_changed();
        }
        if !rejected.is_empty() {
            self.notify_rejected(&rejected);
        }
    }

    /// Out-of-range indices are ignored; a stale index must never fail.
    pub fn remove_file(&mut self, index: usize) {
        if index >= self.files.len() {
            debug!(
                "Ignoring removal of index {} from {} files",
                index,
                self.files.len()
            );
            return;
        }

        let removed = self.files.remove(index);
        debug!("Removed file {}", removed.name());
        self.release(removed);
        self.notify_changed();
    }

    /// Records an externally supplied file list for adoption. Only the most
    /// recent list survives until `adopt_current_files` runs.
    pub fn set_current_files(&mut self, files: Vec<RawFile>) {
        if self.pending_current_files.replace(files).is_some() {
            debug!("Superseding a pending current-files list");
        }
    }

    /// Applies the pending list, if any. Returns whether a list was adopted.
    pub fn adopt_current_files(&mut self) -> bool {
        match self.pending_current_files.take() {
            Some(files) => {
                self.replace_files(files);
                true
            }
            None => false,
        }
    }

    fn validate(&self, candidate: &RawFile) -> Result<(), SelectionError> {
        if !candidate.validate_size(self.options.max_size) {
            return Err(SelectionError::SizeExceeded {
                name: candidate.name.clone(),
                limit: format_limit(self.options.max_size),
            });
        }

        if candidate.category() != self.options.accepted_type {
            return Err(SelectionError::TypeRejected {
                mime_type: candidate.mime_type.clone(),
            });
        }

        Ok(())
    }

    fn replace_single(&mut self, accepted: Vec<RawFile>) {
        for previous in std::mem::take(&mut self.files) {
            self.release(previous);
        }

        if let Some(first) = accepted.into_iter().next() {
            let selected = self.adopt(first);
            self.files.push(selected);
        }
    }

    /// Appends up to the remaining room. Candidates beyond the room are dropped
    /// without a report; a full selection rejects the whole batch instead.
    fn append_within_room(&mut self, accepted: Vec<RawFile>) -> bool {
        let room = self.options.max_files.saturating_sub(self.files.len());

        if room == 0 {
            let reason = SelectionError::CountExceeded {
                max_files: self.options.max_files,
            }
            .to_string();
            warn!("{} ({} files refused)", reason, accepted.len());
            self.errors.push(reason.clone());

            let refused: Vec<SelectedFile> = accepted
                .into_iter()
                .map(|file| SelectedFile::rejected(file, reason.clone()))
                .collect();
            self.notify_rejected(&refused);
            return false;
        }

        if accepted.len() > room {
            debug!(
                "Dropping {} files beyond the remaining room of {}",
                accepted.len() - room,
                room
            );
        }

        for file in accepted.into_iter().take(room) {
            let selected = self.adopt(file);
            self.files.push(selected);
        }
        true
    }

    /// Replaces the whole list. Entries matching an incoming file keep their
    /// preview; every other previous preview is revoked.
    fn replace_files(&mut self, incoming: Vec<RawFile>) {
        let mut previous: Vec<Option<SelectedFile>> =
            std::mem::take(&mut self.files).into_iter().map(Some).collect();

        let mut next = Vec::with_capacity(incoming.len().min(self.options.max_files));
        for file in incoming.into_iter().take(self.options.max_files) {
            let reused = previous
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|kept| kept.file.same_file(&file)))
                .and_then(Option::take);

            next.push(match reused {
                Some(kept) => kept,
                None => self.adopt(file),
            });
        }

        for leftover in previous.into_iter().flatten() {
            self.release(leftover);
        }

        self.files = next;
        self.errors.clear();
    }

    fn adopt(&self, file: RawFile) -> SelectedFile {
        let preview = match file.category() {
            FileCategory::Image => Some(self.previews.allocate(&file)),
            _ => None,
        };
        SelectedFile::accepted(file, preview)
    }

    fn release(&self, file: SelectedFile) {
        if let Some(handle) = file.preview {
            self.previews.revoke(handle);
        }
    }

    fn notify_changed(&mut self) {
        if let Some(callback) = self.on_files_changed.as_mut() {
            callback(&self.files);
        }
    }

    fn notify_rejected(&mut self, rejected: &[SelectedFile]) {
        if let Some(callback) = self.on_files_rejected.as_mut() {
            callback(rejected);
        }
    }
}

impl Drop for FileSelectionController {
    fn drop(&mut self) {
        for file in std::mem::take(&mut self.files) {
            self.release(file);
        }
    }
}

impl fmt::Debug for FileSelectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSelectionController")
            .field("options", &self.options)
            .field("files", &self.files)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use bytes::Bytes;
    use uuid::Uuid;

    use super::*;
    use crate::domain::models::file::PreviewHandle;

    #[derive(Default)]
    struct CountingPreviews {
        allocated: AtomicUsize,
        revoked: Mutex<Vec<Uuid>>,
    }

    impl CountingPreviews {
        fn allocated(&self) -> usize {
            self.allocated.load(Ordering::SeqCst)
        }

        fn revoked(&self) -> Vec<Uuid> {
            self.revoked.lock().unwrap().clone()
        }
    }

    impl PreviewService for CountingPreviews {
        fn allocate(&self, _file: &RawFile) -> PreviewHandle {
            self.allocated.fetch_add(1, Ordering::SeqCst);
            let id = Uuid::new_v4();
            PreviewHandle::new(id, format!("/previews/{id}"))
        }

        fn revoke(&self, handle: PreviewHandle) {
            self.revoked.lock().unwrap().push(handle.id());
        }
    }

    fn image(name: &str, size: usize) -> RawFile {
        RawFile::new(name, "image/png", Bytes::from(vec![0u8; size]))
    }

    fn options(max_files: usize, max_size: u64) -> SelectionOptions {
        SelectionOptions {
            max_files,
            max_size,
            accepted_type: FileCategory::Image,
        }
    }

    fn names(files: &[SelectedFile]) -> Vec<String> {
        files.iter().map(|f| f.name().to_string()).collect()
    }

    #[test]
    fn oversized_file_is_rejected_with_name_and_limit() {
        let previews = Arc::new(CountingPreviews::default());
        let rejected = Arc::new(Mutex::new(Vec::new()));
        let sink = rejected.clone();
        let mut controller = FileSelectionController::new(options(1, 1_572_864), previews.clone())
            .on_files_rejected(move |files| sink.lock().unwrap().extend(names(files)));

        controller.handle_files(vec![image("huge.png", 1_572_865)]);

        assert!(controller.is_empty());
        assert_eq!(
            controller.errors(),
            ["File huge.png is too large. Maximum size is 1.5 MB"]
        );
        assert_eq!(*rejected.lock().unwrap(), vec!["huge.png".to_string()]);
        assert_eq!(previews.allocated(), 0);
    }

    #[test]
    fn file_at_exact_limit_is_accepted() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(1, 10), previews);

        controller.handle_files(vec![image("edge.png", 10)]);

        assert_eq!(names(controller.files()), ["edge.png"]);
        assert!(controller.errors().is_empty());
    }

    #[test]
    fn wrong_category_is_rejected_with_mime_type() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(3, 1024), previews);

        controller.handle_files(vec![
            RawFile::new("song.mp3", "audio/mpeg", Bytes::from_static(b"abc")),
            image("ok.png", 3),
        ]);

        assert_eq!(names(controller.files()), ["ok.png"]);
        assert_eq!(controller.errors(), ["File type audio/mpeg is not accepted"]);
    }

    #[test]
    fn rejected_entries_carry_their_reason() {
        let previews = Arc::new(CountingPreviews::default());
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = reasons.clone();
        let mut controller = FileSelectionController::new(options(3, 1024), previews)
            .on_files_rejected(move |files| {
                sink.lock().unwrap().extend(
                    files
                        .iter()
                        .map(|f| (f.validation_error.clone(), f.preview.is_none())),
                )
            });

        controller.handle_files(vec![RawFile::new(
            "notes.txt",
            "text/plain",
            Bytes::from_static(b"x"),
        )]);

        assert_eq!(
            *reasons.lock().unwrap(),
            vec![(Some("File type text/plain is not accepted".to_string()), true)]
        );
    }

    #[test]
    fn only_images_get_previews() {
        let previews = Arc::new(CountingPreviews::default());
        let mut video = options(3, 1024);
        video.accepted_type = FileCategory::Video;
        let mut controller = FileSelectionController::new(video, previews.clone());

        controller.handle_files(vec![RawFile::new(
            "clip.mp4",
            "video/mp4",
            Bytes::from_static(b"1234"),
        )]);

        assert_eq!(controller.files().len(), 1);
        assert!(controller.files()[0].preview.is_none());
        assert_eq!(previews.allocated(), 0);
    }

    #[test]
    fn single_file_mode_replaces_and_revokes_previous_preview() {
        let previews = Arc::new(CountingPreviews::default());
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let mut controller = FileSelectionController::new(options(1, 1024), previews.clone())
            .on_files_changed(move |files| sink.lock().unwrap().push(names(files)));

        controller.handle_files(vec![image("first.png", 4)]);
        let first_id = controller.files()[0].preview.as_ref().unwrap().id();

        controller.handle_files(vec![image("second.png", 4), image("third.png", 4)]);

        assert_eq!(names(controller.files()), ["second.png"]);
        assert_eq!(previews.revoked(), vec![first_id]);
        assert_eq!(previews.allocated(), 2);
        assert_eq!(
            *changes.lock().unwrap(),
            vec![vec!["first.png".to_string()], vec!["second.png".to_string()]]
        );
    }

    #[test]
    fn single_file_mode_keeps_selection_when_nothing_is_accepted() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(1, 8), previews.clone());

        controller.handle_files(vec![image("keep.png", 4)]);
        controller.handle_files(vec![image("too-big.png", 9)]);

        assert_eq!(names(controller.files()), ["keep.png"]);
        assert!(previews.revoked().is_empty());
    }

    #[test]
    fn partial_room_fills_up_and_drops_the_rest_silently() {
        let previews = Arc::new(CountingPreviews::default());
        let rejected_calls = Arc::new(AtomicUsize::new(0));
        let counter = rejected_calls.clone();
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone())
            .on_files_rejected(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);
        controller.handle_files(vec![image("c.png", 1), image("d.png", 1), image("e.png", 1)]);

        assert_eq!(names(controller.files()), ["a.png", "b.png", "c.png"]);
        assert_eq!(rejected_calls.load(Ordering::SeqCst), 0);
        assert!(controller.errors().is_empty());
        assert_eq!(previews.allocated(), 3);
    }

    #[test]
    fn full_selection_rejects_the_whole_batch() {
        let previews = Arc::new(CountingPreviews::default());
        let changed_calls = Arc::new(AtomicUsize::new(0));
        let rejected = Arc::new(Mutex::new(Vec::new()));
        let changed = changed_calls.clone();
        let sink = rejected.clone();
        let mut controller = FileSelectionController::new(options(2, 1024), previews.clone())
            .on_files_changed(move |_| {
                changed.fetch_add(1, Ordering::SeqCst);
            })
            .on_files_rejected(move |files| {
                sink.lock().unwrap().push(
                    files
                        .iter()
                        .map(|f| f.validation_error.clone().unwrap_or_default())
                        .collect::<Vec<_>>(),
                )
            });

        controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);
        assert_eq!(changed_calls.load(Ordering::SeqCst), 1);

        controller.handle_files(vec![image("c.png", 1)]);

        assert_eq!(names(controller.files()), ["a.png", "b.png"]);
        assert_eq!(changed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.errors(), ["Maximum 2 files allowed"]);
        assert_eq!(
            *rejected.lock().unwrap(),
            vec![vec!["Maximum 2 files allowed".to_string()]]
        );
        assert_eq!(previews.allocated(), 2);
    }

    #[test]
    fn validation_and_count_rejections_are_reported_separately() {
        let previews = Arc::new(CountingPreviews::default());
        let batches = Arc::new(Mutex::new(Vec::new()));
        let sink = batches.clone();
        let mut controller = FileSelectionController::new(options(2, 4), previews)
            .on_files_rejected(move |files| sink.lock().unwrap().push(names(files)));

        controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);
        controller.handle_files(vec![image("big.png", 5), image("c.png", 1)]);

        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.contains(&vec!["big.png".to_string()]));
        assert!(batches.contains(&vec!["c.png".to_string()]));
        assert_eq!(
            controller.errors(),
            [
                "File big.png is too large. Maximum size is 0 MB",
                "Maximum 2 files allowed"
            ]
        );
    }

    #[test]
    fn errors_are_replaced_on_each_pass() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(3, 4), previews);

        controller.handle_files(vec![image("big.png", 5)]);
        assert_eq!(controller.errors().len(), 1);

        controller.handle_files(vec![image("fine.png", 1)]);
        assert!(controller.errors().is_empty());
    }

    #[test]
    fn remove_file_revokes_and_notifies() {
        let previews = Arc::new(CountingPreviews::default());
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone())
            .on_files_changed(move |files| sink.lock().unwrap().push(names(files)));

        controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);
        let a_id = controller.files()[0].preview.as_ref().unwrap().id();

        controller.remove_file(0);

        assert_eq!(names(controller.files()), ["b.png"]);
        assert_eq!(previews.revoked(), vec![a_id]);
        assert_eq!(changes.lock().unwrap().last().unwrap(), &vec!["b.png".to_string()]);
    }

    #[test]
    fn remove_file_out_of_range_is_a_no_op() {
        let previews = Arc::new(CountingPreviews::default());
        let changed_calls = Arc::new(AtomicUsize::new(0));
        let changed = changed_calls.clone();
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone())
            .on_files_changed(move |_| {
                changed.fetch_add(1, Ordering::SeqCst);
            });

        controller.handle_files(vec![image("a.png", 1)]);
        controller.remove_file(1);
        controller.remove_file(42);

        assert_eq!(names(controller.files()), ["a.png"]);
        assert_eq!(changed_calls.load(Ordering::SeqCst), 1);
        assert!(previews.revoked().is_empty());
    }

    #[test]
    fn every_preview_is_revoked_exactly_once() {
        let previews = Arc::new(CountingPreviews::default());
        {
            let mut controller = FileSelectionController::new(options(3, 1024), previews.clone());
            controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);
            controller.remove_file(1);
            controller.handle_files(vec![image("c.png", 1), image("d.png", 1)]);
            controller.handle_files(vec![image("e.png", 1)]);
            controller.remove_file(0);
            controller.set_current_files(vec![image("c.png", 1), image("f.png", 1)]);
            controller.adopt_current_files();
        }

        let mut revoked = previews.revoked();
        let total = revoked.len();
        revoked.sort();
        revoked.dedup();
        assert_eq!(revoked.len(), total);
        assert_eq!(total, previews.allocated());
    }

    #[test]
    fn current_files_seed_the_selection_without_notifying() {
        let previews = Arc::new(CountingPreviews::default());
        let changed_calls = Arc::new(AtomicUsize::new(0));
        let changed = changed_calls.clone();
        let controller = FileSelectionController::new(options(2, 1024), previews.clone())
            .on_files_changed(move |_| {
                changed.fetch_add(1, Ordering::SeqCst);
            })
            .with_current_files(vec![image("a.png", 1), image("b.png", 1), image("c.png", 1)]);

        assert_eq!(names(controller.files()), ["a.png", "b.png"]);
        assert_eq!(changed_calls.load(Ordering::SeqCst), 0);
        assert_eq!(previews.allocated(), 2);
    }

    #[test]
    fn latest_pending_current_files_win() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone());

        controller.set_current_files(vec![image("old.png", 1)]);
        controller.set_current_files(vec![image("new.png", 1)]);
        assert!(controller.is_empty());

        assert!(controller.adopt_current_files());
        assert_eq!(names(controller.files()), ["new.png"]);
        assert!(!controller.adopt_current_files());
        assert_eq!(previews.allocated(), 1);
    }

    #[test]
    fn adopting_keeps_previews_of_files_still_present() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone());

        controller.handle_files(vec![image("keep.png", 2), image("drop.png", 3)]);
        let keep_id = controller.files()[0].preview.as_ref().unwrap().id();
        let drop_id = controller.files()[1].preview.as_ref().unwrap().id();

        controller.set_current_files(vec![image("keep.png", 2), image("add.png", 1)]);
        controller.adopt_current_files();

        assert_eq!(names(controller.files()), ["keep.png", "add.png"]);
        assert_eq!(controller.files()[0].preview.as_ref().unwrap().id(), keep_id);
        assert_eq!(previews.revoked(), vec![drop_id]);
    }

    #[test]
    fn dropping_the_controller_revokes_outstanding_previews() {
        let previews = Arc::new(CountingPreviews::default());
        let mut controller = FileSelectionController::new(options(3, 1024), previews.clone());
        controller.handle_files(vec![image("a.png", 1), image("b.png", 1)]);

        drop(controller);

        assert_eq!(previews.revoked().len(), 2);
    }
}
