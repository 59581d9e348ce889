//! Function-pointer finite state machine engine.
//!
//! Both feeder state machines (application motion and motor drive) are
//! tables of this shape:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Init    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Idle    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ ...     │           │          │                   │  │
//! │  └─────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer. The engine is the only code that assigns the current
//! state, so every machine has exactly one writer.

pub mod messages;
pub mod motion;
pub mod motor;

use core::fmt::Debug;

use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// A closed set of states usable as a table index.
pub trait StateId: Copy + Eq + Debug + 'static {
    /// Position of this state in its table.
    fn index(self) -> usize;

    /// Convert a table index back to the state.
    fn from_index(idx: usize) -> Self;
}

/// Context hook through which the engine publishes state timing.
pub trait StateClock {
    fn set_ticks_in_state(&mut self, ticks: u64);
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn<C> = fn(&mut C);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<S, C> = fn(&mut C) -> Option<S>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array, no heap, no `dyn`.
pub struct StateDescriptor<S, C> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<C>>,
    pub on_exit: Option<StateActionFn<C>>,
    pub on_update: StateUpdateFn<S, C>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and drives a caller-owned context through it.
pub struct Fsm<S: StateId, C, const N: usize> {
    /// Label used in transition logs.
    label: &'static str,
    /// Fixed-size table indexed by `StateId::index()`.
    table: [StateDescriptor<S, C>; N],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl<S: StateId, C: StateClock, const N: usize> Fsm<S, C, N> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(label: &'static str, table: [StateDescriptor<S, C>; N], initial: S) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "state table out of order"
        );
        Self {
            label,
            table,
            current: initial.index(),
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut C) {
        info!("FSM[{}] starting in state: {}", self.label, self.table[self.current].name);
        ctx.set_ticks_in_state(0);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut C) {
        self.tick_count += 1;
        ctx.set_ticks_in_state(self.tick_count - self.state_entry_tick);

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> S {
        S::from_index(self.current)
    }

    /// Name of the current state as given in the table.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: S, ctx: &mut C) {
        let next_idx = next_id.index();

        info!(
            "FSM[{}] transition: {} -> {}",
            self.label, self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.set_ticks_in_state(0);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
