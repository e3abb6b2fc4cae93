use crate::{
    car::{Car, CarPose},
    collision::{check_collision, find_collision, Collision},
    config::ExecutorConfig,
    constants::{MAX_ROLLBACK_STEPS, TARGET_RESOLUTION},
    moves::{Move, MoveKind, StopCondition},
    speed_control::{SpeedRamp, SpeedRampInit},
    steer_control::{SteerControl, SteerController},
    street::Street,
};
use glam::DVec2;
use log::{debug, info, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

#[derive(Debug, Clone)]
pub struct ExecutorInit {
    pub tick_rate_hz: f64,
    /// Canvas units per second.
    pub speed: f64,
    pub steering_rate: f64,
    pub ramp: SpeedRampInit,
}

impl ExecutorInit {
    /// Expects a configuration already scaled to canvas units.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            tick_rate_hz: config.tick_rate_hz,
            speed: config.speed,
            steering_rate: config.steering_rate,
            ramp: SpeedRampInit {
                start_fraction: config.ramp_start_fraction,
                ramp_ticks: config.ramp_ticks,
            },
        }
    }

    pub fn build(&self, car: Car, street: Street) -> Executor {
        let Self {
            tick_rate_hz,
            speed,
            steering_rate,
            ref ramp,
        } = *self;
        let tick_duration = 1.0 / tick_rate_hz;
        let steer = SteerController::from_params(car.params(), steering_rate, tick_duration);

        Executor {
            car,
            street,
            tick_duration,
            speed,
            ramp: ramp.build(),
            steer,
            controls: Controls::default(),
            state: State::Idle,
            active: None,
            ticks: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Controls {
    paused: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl Controls {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    Running,
    Finished(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    TargetReached,
    StopCondition,
    Collided,
    Cancelled,
    /// The arc turns away from its target rotation; nothing moved.
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub state: State,
    pub tick: usize,
    pub pose: CarPose,
    /// Distance or angle covered so far in the current move.
    pub progress: f64,
    pub collision: Option<Collision>,
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Steer,
    Straight {
        sign: f64,
        target: f64,
    },
    Arc {
        centre: DVec2,
        radius: f64,
        sign: f64,
        target: f64,
    },
}

#[derive(Debug, Clone)]
struct Active {
    motion: Motion,
    stop: Option<StopCondition>,
    message: Option<String>,
    done: f64,
}

#[derive(Debug)]
pub struct Executor {
    car: Car,
    street: Street,
    tick_duration: f64,
    speed: f64,
    ramp: SpeedRamp,
    steer: SteerController,
    controls: Controls,
    state: State,
    active: Option<Active>,
    ticks: usize,
}

impl Executor {
    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn street(&self) -> &Street {
        &self.street
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    pub fn message(&self) -> Option<&str> {
        self.active.as_ref()?.message.as_deref()
    }

    /// Puts the car back at `pose` and drops the running move.
    pub fn reset(&mut self, pose: CarPose) {
        self.car.set_pose(pose);
        self.state = State::Idle;
        self.active = None;
        self.ticks = 0;
        self.ramp.reset();
    }

    /// Resolves the move against the current pose and makes it the running
    /// move.
    pub fn start(&mut self, step: &Move) {
        let Self {
            ref mut car,
            ref mut steer,
            ref mut ramp,
            ..
        } = *self;

        let motion = match step.kind {
            MoveKind::Steer(lock) => {
                steer.set_target(car.params(), lock);
                Motion::Steer
            }
            MoveKind::Straight {
                direction,
                distance,
            } => {
                let (direction, target) = distance.resolve(direction, car);
                Motion::Straight {
                    sign: direction.sign(),
                    target,
                }
            }
            MoveKind::Arc {
                direction,
                angle,
                distance,
            } => match car.turn_centre_offset() {
                Some(offset) => {
                    let sign = direction.sign() * offset.signum();
                    let Some(target) = angle.resolve(car, sign) else {
                        warn!("{step} turns away from its target rotation, not moving");
                        self.ticks = 0;
                        self.active = None;
                        self.state = State::Finished(Outcome::Unreachable);
                        return;
                    };
                    Motion::Arc {
                        centre: car.body_point(0.0, offset),
                        radius: offset.abs(),
                        sign,
                        target,
                    }
                }
                None => {
                    let (direction, target) = match distance {
                        Some(distance) => distance.resolve(direction, car),
                        None => {
                            warn!("arc requested with centred wheels and no distance, not moving");
                            (direction, 0.0)
                        }
                    };
                    debug!("centred wheels, arc replaced by a straight move of {target:.3}");
                    Motion::Straight {
                        sign: direction.sign(),
                        target,
                    }
                }
            },
        };

        info!("start {step}");
        ramp.reset();
        self.ticks = 0;
        self.state = State::Running;
        self.active = Some(Active {
            motion,
            stop: step.stop,
            message: step.message.clone(),
            done: 0.0,
        });
    }

    pub fn tick(&mut self) -> Report {
        if self.state != State::Running {
            return self.report(None);
        }

        if self.controls.is_cancelled() {
            info!("move cancelled after {} ticks", self.ticks);
            self.state = State::Finished(Outcome::Cancelled);
            return self.report(None);
        }
        if self.controls.is_paused() {
            return self.report(None);
        }

        let Some(mut active) = self.active.take() else {
            self.state = State::Idle;
            return self.report(None);
        };
        self.ticks += 1;

        let (outcome, collision) = match active.motion {
            Motion::Steer => {
                let SteerControl { arrived, .. } = self.steer.step(self.car.pose_mut());
                let outcome = if active.stop.is_some_and(|stop| stop.is_met(&self.car)) {
                    Some(Outcome::StopCondition)
                } else if arrived {
                    Some(Outcome::TargetReached)
                } else {
                    None
                };
                (outcome, None)
            }
            Motion::Straight { sign, target } => {
                let step = self.speed * self.tick_duration * self.ramp.step();
                let increment = (target - active.done).min(step);
                self.car.translate(sign * increment);
                active.done += increment;

                self.settle(&mut active, target, |car, _| {
                    car.translate(-sign * increment);
                    increment
                })
            }
            Motion::Arc {
                centre,
                radius,
                sign,
                target,
            } => {
                let step = self.speed * self.tick_duration * self.ramp.step() / radius;
                let increment = (target - active.done).min(step);
                self.car.rotate_about(centre, sign * increment);
                active.done += increment;

                self.settle(&mut active, target, |car, street| {
                    let mut steps = 0;
                    while check_collision(car, street) && steps < MAX_ROLLBACK_STEPS {
                        car.rotate_about(centre, -sign * step);
                        steps += 1;
                    }
                    if steps == MAX_ROLLBACK_STEPS {
                        warn!("arc rollback gave up after {steps} steps");
                    }
                    steps as f64 * step
                })
            }
        };

        self.active = Some(active);
        if let Some(outcome) = outcome {
            info!("move finished: {outcome:?} after {} ticks", self.ticks);
            self.state = State::Finished(outcome);
        }
        self.report(collision)
    }

    /// Checks the stop condition, collisions and the target, in that order.
    fn settle<F>(
        &mut self,
        active: &mut Active,
        target: f64,
        rollback: F,
    ) -> (Option<Outcome>, Option<Collision>)
    where
        F: FnOnce(&mut Car, &Street) -> f64,
    {
        if active.stop.is_some_and(|stop| stop.is_met(&self.car)) {
            return (Some(Outcome::StopCondition), None);
        }
        if let Some(collision) = find_collision(&self.car, &self.street) {
            warn!("collision: {collision}");
            active.done = (active.done - rollback(&mut self.car, &self.street)).max(0.0);
            return (Some(Outcome::Collided), Some(collision));
        }
        if reached(active.done, target) {
            return (Some(Outcome::TargetReached), None);
        }
        (None, None)
    }

    /// Starts the move and ticks until it finishes. Sleeps a tick at a time
    /// while paused.
    pub fn run(&mut self, step: &Move) -> Outcome {
        self.start(step);
        loop {
            if let State::Finished(outcome) = self.tick().state {
                return outcome;
            }
            if self.controls.is_paused() {
                thread::sleep(Duration::from_secs_f64(self.tick_duration));
            }
        }
    }

    fn report(&self, collision: Option<Collision>) -> Report {
        Report {
            state: self.state,
            tick: self.ticks,
            pose: *self.car.pose(),
            progress: self.active.as_ref().map_or(0.0, |active| active.done),
            collision,
        }
    }
}

fn reached(done: f64, target: f64) -> bool {
    (done * TARGET_RESOLUTION).round() >= (target * TARGET_RESOLUTION).round()
}
