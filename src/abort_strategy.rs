/// Enum with possible abort strategies.
/// Every strategy ends a running calculation as soon as an assignment step reproduces the cluster
/// assignments of the previous one (a fixed point). The strategies differ in whether the calculation
/// may additionally be cut short before reaching that fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortStrategy {
	/// Iterate until the cluster assignments are stable, without any iteration cap.
	UntilStable,
	/// Iterate until the cluster assignments are stable, but do at most **max_iter** centroid updates.
	/// When the cap is hit, the calculation ends with `converged == false` in the resulting state.
	/// ## Fields:
	/// - **max_iter**: Maximum amount of centroid updates
	MaxIterations { max_iter: usize },
}
impl Default for AbortStrategy {
	fn default() -> Self { AbortStrategy::UntilStable }
}
impl AbortStrategy {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic> {
		match *self {
			AbortStrategy::UntilStable => Box::new(UntilStableLogic {
				prev_assignments: None
			}),
			AbortStrategy::MaxIterations{max_iter} => Box::new(MaxIterationsLogic {
				max_iter,
				updates: 0,
				stable: UntilStableLogic { prev_assignments: None }
			})
		}
	}
}

/// Outcome of one assignment step, as judged by an abort strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
	/// Update the centroids and run another assignment step.
	Continue,
	/// Assignments did not change, the calculation reached a fixed point.
	Converged,
	/// Assignments are still moving, but no further update is allowed.
	IterationLimit,
}

pub(crate) trait AbortStrategyLogic {
	/// Function that has to be called once an assignment step of the calculation ended.
	/// ## Arguments
	/// - **assignments**: The cluster assignments produced by that step
	/// ## Returns
	/// The [`Verdict`] on how the calculation proceeds.
	fn next(&mut self, assignments: &[usize]) -> Verdict;
}


pub(crate) struct UntilStableLogic {
	prev_assignments: Option<Vec<usize>>
}
impl AbortStrategyLogic for UntilStableLogic {
	fn next(&mut self, assignments: &[usize]) -> Verdict {
		match &mut self.prev_assignments {
			Some(prev) if prev.as_slice() == assignments => Verdict::Converged,
			Some(prev) => {
				prev.copy_from_slice(assignments);
				Verdict::Continue
			},
			None => {
				self.prev_assignments = Some(assignments.to_vec());
				Verdict::Continue
			}
		}
	}
}


pub(crate) struct MaxIterationsLogic {
	max_iter: usize,
	updates: usize,
	stable: UntilStableLogic
}
impl AbortStrategyLogic for MaxIterationsLogic {
	fn next(&mut self, assignments: &[usize]) -> Verdict {
		match self.stable.next(assignments) {
			Verdict::Converged => Verdict::Converged,
			_ if self.updates >= self.max_iter => Verdict::IterationLimit,
			verdict => {
				self.updates += 1;
				verdict
			}
		}
	}
}
