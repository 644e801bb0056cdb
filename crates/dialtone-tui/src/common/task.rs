use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Login,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by the reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Marks `id` active as soon as the reducer requests it, before the
    /// runtime reports `TaskStarted`. The returned token travels with the
    /// spawn effect, so the task is cancellable from the first keypress.
    pub fn begin(&mut self, id: TaskId) -> CancellationToken {
        let cancel = CancellationToken::new();
        self.active = Some(id);
        self.cancel = Some(cancel.clone());
        cancel
    }

    /// Ignored unless `started.id` is the active task.
    pub fn on_started(&mut self, started: &TaskStarted) {
        if self.active != Some(started.id) {
            return;
        }
        if let Some(cancel) = &started.cancel {
            self.cancel = Some(cancel.clone());
        }
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub login: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Login => &self.login,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Login => &mut self.login,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.login.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut seq = TaskSeq::default();
        let first = seq.next_id();
        let second = seq.next_id();
        assert_ne!(first, second);

        let mut state = TaskState::default();
        let _ = state.begin(second);

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }

    #[test]
    fn test_begin_hands_out_cancel_token() {
        let mut tasks = Tasks::default();
        let cancel = tasks.state_mut(TaskKind::Login).begin(TaskId(7));

        assert!(tasks.is_any_running());
        let held = tasks.state(TaskKind::Login).cancel.clone().unwrap();
        held.cancel();
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_on_started_for_other_task_is_ignored() {
        let mut tasks = Tasks::default();
        let cancel = tasks.state_mut(TaskKind::Login).begin(TaskId(2));

        tasks.state_mut(TaskKind::Login).on_started(&TaskStarted {
            id: TaskId(1),
            cancel: Some(CancellationToken::new()),
        });

        assert_eq!(tasks.login.active, Some(TaskId(2)));
        tasks.login.cancel.clone().unwrap().cancel();
        assert!(cancel.is_cancelled());
    }
}
