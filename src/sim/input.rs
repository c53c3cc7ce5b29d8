//! Per-tick input: a held-key snapshot plus queued edge actions
//!
//! Key-down/key-up handlers never touch simulation state directly. They
//! update the held set and queue [`Action`]s, which the next tick consumes
//! first, in arrival order.

bitflags::bitflags! {
    /// Keys currently held
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Keys: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const UP     = 1 << 2;
        const DOWN   = 1 << 3;
        const SPRINT = 1 << 4;
        const JUMP   = 1 << 5;
        const ATTACK = 1 << 6;
        const TAUNT  = 1 << 7;
    }
}

/// Symbolic physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Sprint,
    Jump,
    Attack,
    Taunt,
}

impl Key {
    pub fn flag(self) -> Keys {
        match self {
            Key::Left => Keys::LEFT,
            Key::Right => Keys::RIGHT,
            Key::Up => Keys::UP,
            Key::Down => Keys::DOWN,
            Key::Sprint => Keys::SPRINT,
            Key::Jump => Keys::JUMP,
            Key::Attack => Keys::ATTACK,
            Key::Taunt => Keys::TAUNT,
        }
    }
}

/// Edge-triggered actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Attack,
    Taunt,
    /// Up released; fires an armed super jump
    SuperJumpRelease,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub held: Keys,
    /// Consumed before any physics, in order
    pub actions: Vec<Action>,
}

impl TickInput {
    pub fn held(held: Keys) -> Self {
        Self {
            held,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[inline]
    pub fn is_held(&self, keys: Keys) -> bool {
        self.held.contains(keys)
    }
}

/// Accumulates physical key events between ticks
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    held: Keys,
    pending: Vec<Action>,
}

impl InputQueue {
    pub fn key_down(&mut self, key: Key) {
        // Auto-repeat shouldn't re-fire actions
        if self.held.contains(key.flag()) {
            return;
        }
        self.held.insert(key.flag());
        match key {
            Key::Jump => self.pending.push(Action::Jump),
            Key::Attack => self.pending.push(Action::Attack),
            Key::Taunt => self.pending.push(Action::Taunt),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(key.flag());
        if key == Key::Up {
            self.pending.push(Action::SuperJumpRelease);
        }
    }

    /// Snapshot for the next tick; queued actions are handed over once
    pub fn take(&mut self) -> TickInput {
        TickInput {
            held: self.held,
            actions: std::mem::take(&mut self.pending),
        }
    }
}
