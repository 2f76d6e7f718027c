//! Reducer trait for MVI architecture.

use std::fmt;
use std::marker::PhantomData;

use super::intent::Intent;
use super::state::StoreState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Intent) -> State
///
/// Reducers that do not recognize an intent return the state unchanged.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: StoreState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the new state.
    ///
    /// This should be a pure function with no side effects.
    fn reduce(&self, state: Self::State, intent: &Self::Intent) -> Self::State;
}

/// Reducer backed by a plain function or closure.
pub struct FnReducer<S, I, F> {
    f: F,
    _marker: PhantomData<fn(S, &I) -> S>,
}

impl<S, I, F> FnReducer<S, I, F>
where
    S: StoreState,
    I: Intent,
    F: Fn(S, &I) -> S + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<S, I, F> Reducer for FnReducer<S, I, F>
where
    S: StoreState,
    I: Intent,
    F: Fn(S, &I) -> S + Send + Sync + 'static,
{
    type State = S;
    type Intent = I;

    fn reduce(&self, state: S, intent: &I) -> S {
        (self.f)(state, intent)
    }
}

/// Several reducers applied in order to the same intent.
///
/// Each reducer sees the state produced by the ones before it, so
/// unrelated reducers can share one state type without knowing about
/// each other's intents.
pub struct Combined<S, I> {
    reducers: Vec<Box<dyn Reducer<State = S, Intent = I>>>,
}

impl<S: StoreState, I: Intent> Combined<S, I> {
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    /// Append a reducer to the end of the sequence.
    pub fn with(mut self, reducer: impl Reducer<State = S, Intent = I>) -> Self {
        self.reducers.push(Box::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S: StoreState, I: Intent> Default for Combined<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, I> fmt::Debug for Combined<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combined")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S: StoreState, I: Intent> Reducer for Combined<S, I> {
    type State = S;
    type Intent = I;

    fn reduce(&self, state: S, intent: &I) -> S {
        self.reducers
            .iter()
            .fold(state, |state, reducer| reducer.reduce(state, intent))
    }
}

/// Combine boxed reducers into one sequential reducer.
pub fn combine<S: StoreState, I: Intent>(
    reducers: Vec<Box<dyn Reducer<State = S, Intent = I>>>,
) -> Combined<S, I> {
    Combined { reducers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        value: i64,
        log: Vec<String>,
    }

    impl StoreState for Counter {}

    #[derive(Debug)]
    enum CounterIntent {
        Add(i64),
        Double,
    }

    impl Intent for CounterIntent {}

    fn adder(
    ) -> FnReducer<Counter, CounterIntent, impl Fn(Counter, &CounterIntent) -> Counter + Send + Sync>
    {
        FnReducer::new(|mut state: Counter, intent: &CounterIntent| {
            if let CounterIntent::Add(n) = intent {
                state.value += n;
            }
            state
        })
    }

    fn doubler(
    ) -> FnReducer<Counter, CounterIntent, impl Fn(Counter, &CounterIntent) -> Counter + Send + Sync>
    {
        FnReducer::new(|mut state: Counter, intent: &CounterIntent| {
            if let CounterIntent::Double = intent {
                state.value *= 2;
            }
            state.log.push(format!("{}", state.value));
            state
        })
    }

    #[test]
    fn combined_applies_in_order() {
        let reducer = Combined::new().with(adder()).with(doubler());
        let state = reducer.reduce(Counter::default(), &CounterIntent::Add(3));
        assert_eq!(state.value, 3);
        // doubler ran second and observed the adder's result
        assert_eq!(state.log, vec!["3".to_string()]);
    }

    #[test]
    fn unrecognized_intent_leaves_value() {
        let state = adder().reduce(
            Counter {
                value: 7,
                log: vec![],
            },
            &CounterIntent::Double,
        );
        assert_eq!(state.value, 7);
    }

    #[test]
    fn combine_from_boxes() {
        let reducer = combine(vec![Box::new(adder()), Box::new(doubler())]);
        assert_eq!(reducer.len(), 2);
        let state = reducer.reduce(Counter::default(), &CounterIntent::Add(2));
        let state = reducer.reduce(state, &CounterIntent::Double);
        assert_eq!(state.value, 4);
        assert_eq!(state.log, vec!["2".to_string(), "4".to_string()]);
    }
}
