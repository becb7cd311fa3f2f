use std::collections::VecDeque;
use std::time::Instant;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::board::Board;
use crate::data::{Indexes, SchedulingInput, SolverConfig};
use crate::report::{self, Diagnostics, FailureInfo, FailureReport, ScheduleSuccess};
use crate::validate;
use crate::variables::{self, Placement, Variable};

/// How many recent variable failures the history keeps.
const FAILURE_HISTORY: usize = 16;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("input validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{}", .0.root_cause)]
    Unsolvable(Box<FailureReport>),
}

/// Per-depth search state: the domain computed when the depth was entered,
/// a cursor over it, and the value currently applied (if any).
struct Frame {
    values: Vec<Placement>,
    cursor: usize,
    applied: Option<usize>,
    tried: usize,
}

impl Frame {
    fn new(values: Vec<Placement>) -> Self {
        Self {
            values,
            cursor: 0,
            applied: None,
            tried: 0,
        }
    }
}

/// Iterative depth-first backtracking over the ordered variable list, with
/// wall-clock and iteration budgets and failure attribution.
struct Search<'a> {
    config: &'a SolverConfig,
    started: Instant,
    iterations: u64,
    last_error: String,
    deepest_error: String,
    deepest_depth: usize,
    history: VecDeque<FailureInfo>,
    suggestions: Vec<String>,
}

impl<'a> Search<'a> {
    fn new(config: &'a SolverConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            iterations: 0,
            last_error: String::new(),
            deepest_error: String::new(),
            deepest_depth: 0,
            history: VecDeque::new(),
            suggestions: Vec::new(),
        }
    }

    fn run(&mut self, variables: &[Variable], board: &mut Board) -> bool {
        let n = variables.len();
        if n == 0 {
            return true;
        }

        let mut stack = vec![Frame::new(board.domain(&variables[0]))];

        loop {
            if self.started.elapsed() > self.config.time_budget {
                self.last_error = "Timeout limit reached.".to_string();
                return false;
            }
            self.iterations += 1;
            if self.iterations > self.config.max_iterations {
                self.last_error = "Max iterations reached.".to_string();
                return false;
            }

            let depth = stack.len() - 1;
            let var = &variables[depth];

            // Advance the cursor to the next value that is still legal.
            // Domains were computed when the depth was entered; other
            // branches may have mutated the board since, so every take is
            // re-validated against live state.
            let mut chosen: Option<Placement> = None;
            {
                let frame = &mut stack[depth];
                while frame.cursor < frame.values.len() {
                    let i = frame.cursor;
                    frame.cursor += 1;
                    if board.is_valid(var, &frame.values[i]) {
                        frame.applied = Some(i);
                        frame.tried += 1;
                        chosen = Some(frame.values[i].clone());
                        break;
                    }
                }
            }

            match chosen {
                Some(val) => {
                    board.apply(var, &val);
                    if stack.len() == n {
                        return true;
                    }
                    let next = board.domain(&variables[stack.len()]);
                    stack.push(Frame::new(next));
                }
                None => {
                    let tried = stack[depth].tried;
                    self.record_exhaustion(var, depth, tried, board);
                    stack.pop();
                    let Some(prev) = stack.last_mut() else {
                        return false;
                    };
                    if let Some(i) = prev.applied.take() {
                        let val = prev.values[i].clone();
                        board.undo(&variables[stack.len() - 1], &val);
                    }
                }
            }
        }
    }

    /// Attributes the cause of a domain running dry at `depth` and records
    /// it into the error slots and the bounded history.
    fn record_exhaustion(&mut self, var: &Variable, depth: usize, tried: usize, board: &Board) {
        let course_name = board
            .course_name(&var.course_id)
            .unwrap_or_else(|| var.course_id.clone());
        let roomless = self.config.roomless_course_ids.contains(&var.course_id);
        let rooms_considered = board.suitable_room_count(var);

        let reason = if tried > 0 {
            format!(
                "Backtracking from {course_name}: {tried} placement(s) tried, none completed the timetable"
            )
        } else if board.qualified_teachers(&var.course_id).is_empty() {
            format!("ROOT CAUSE: No qualified instructor/TA for {course_name}")
        } else if roomless {
            let free_run = board.max_free_run(var);
            if free_run < var.duration {
                self.suggestions.push(format!(
                    "Reduce the duration of {course_name} from {} to {free_run} slot(s), or free up a longer run",
                    var.duration
                ));
            }
            format!(
                "ROOT CAUSE: {course_name} needs {} consecutive slots but the longest free run across its sections is {free_run}",
                var.duration
            )
        } else {
            let mut lines = vec![
                format!("ROOT CAUSE: No feasible room/slot for {course_name}"),
                format!(
                    "  type: {}, duration: {} slot(s), students: {}",
                    var.kind, var.duration, var.total_students
                ),
            ];
            if let Some(subtype) = board.lab_subtype(&var.course_id) {
                lines.push(format!("  lab subtype: {subtype}"));
            }
            lines.push(format!(
                "  rooms passing the type/capacity filter: {rooms_considered} (every one blocked at every feasible slot)"
            ));
            lines.join("\n")
        };

        self.last_error = reason.clone();
        if self.deepest_error.is_empty() || depth >= self.deepest_depth {
            self.deepest_depth = depth;
            self.deepest_error = reason.clone();
        }

        if self.history.len() == FAILURE_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(FailureInfo {
            course_id: var.course_id.clone(),
            course_name,
            section_id: var
                .target_sections
                .first()
                .map(|&j| board.section_id(j).to_string())
                .unwrap_or_default(),
            reason,
            depth,
            placements_tried: tried,
            rooms_considered,
        });
    }

    fn root_cause(&self) -> String {
        if !self.deepest_error.is_empty() {
            self.deepest_error.clone()
        } else if !self.last_error.is_empty() {
            self.last_error.clone()
        } else {
            "No valid solution found.".to_string()
        }
    }
}

/// Runs one full request: validation, variable identification, search, and
/// either the schedule or the failure diagnostics. Everything mutable lives
/// in values owned by this call.
pub fn solve(
    input: &SchedulingInput,
    config: &SolverConfig,
) -> Result<ScheduleSuccess, SolveError> {
    let errors = validate::validate(input);
    if !errors.is_empty() {
        return Err(SolveError::Validation(errors));
    }

    let idx = Indexes::build(input);
    let mut variables = variables::identify(input, &idx, config);
    info!(
        "solving: {} variables over {} sections, {} rooms, {} teachers",
        variables.len(),
        input.sections.len(),
        input.rooms.len(),
        idx.teachers.len()
    );

    let mut rng = config.retry_seed.map(StdRng::seed_from_u64);
    let mut attempt = 0;
    loop {
        let started = Instant::now();
        let mut board = Board::new(input, &idx, config);
        let mut search = Search::new(config);
        let solved = search.run(&variables, &mut board);
        let elapsed_ms = started.elapsed().as_millis();

        if solved {
            info!(
                "timetable generated in {elapsed_ms}ms ({} iterations)",
                search.iterations
            );
            let diagnostics = Diagnostics {
                iterations: search.iterations,
                time_taken_ms: elapsed_ms,
                unscheduled_sections: Vec::new(),
            };
            return Ok(report::success(input, &idx, &board, diagnostics));
        }

        warn!(
            "attempt {attempt} failed after {elapsed_ms}ms ({} iterations): {}",
            search.iterations,
            search.root_cause()
        );

        if attempt >= config.retry_attempts {
            let diagnostics = Diagnostics {
                iterations: search.iterations,
                time_taken_ms: elapsed_ms,
                unscheduled_sections: report::unscheduled_sections(input, &board),
            };
            let root_cause = search.root_cause();
            return Err(SolveError::Unsolvable(Box::new(FailureReport {
                success: false,
                error: root_cause.clone(),
                root_cause,
                last_attempt: search.last_error.clone(),
                failure_chain: search.history.into_iter().collect(),
                diagnostics,
                suggestions: search.suggestions,
            })));
        }

        attempt += 1;
        match rng.as_mut() {
            Some(rng) => variables.shuffle(rng),
            None => variables.shuffle(&mut rand::thread_rng()),
        }
        info!("retrying with a reshuffled variable order (attempt {attempt})");
    }
}
