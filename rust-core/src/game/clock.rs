//! 模拟时钟：可变速率的 tick 驱动、随时间加速以及开局倒计时。
//!
//! 所有时间都以毫秒为单位，由宿主传入（例如 `requestAnimationFrame` 的时间戳），
//! 核心逻辑本身从不读取系统时间。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationClock {
    base_interval_ms: f64,
    tick_interval_ms: f64,
    ramp_factor: f64,
    ramp_interval_ms: f64,
    speed_multiplier: f64,
    max_speed: f64,
    last_tick: f64,
    last_ramp: f64,
    started_at: f64,
    paused_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paused_at: Option<f64>,
}

impl SimulationClock {
    pub fn new(base_interval_ms: f64, ramp_factor: f64, ramp_interval_ms: f64) -> Self {
        Self {
            base_interval_ms,
            tick_interval_ms: base_interval_ms,
            ramp_factor,
            ramp_interval_ms,
            speed_multiplier: 1.0,
            max_speed: 1.0,
            last_tick: 0.0,
            last_ramp: 0.0,
            started_at: 0.0,
            paused_total: 0.0,
            paused_at: None,
        }
    }

    /// 进入 PLAYING 时调用，重置速度与所有锚点。
    pub fn start(&mut self, now_ms: f64) {
        self.tick_interval_ms = self.base_interval_ms;
        self.speed_multiplier = 1.0;
        self.max_speed = 1.0;
        self.last_tick = now_ms;
        self.last_ramp = now_ms;
        self.started_at = now_ms;
        self.paused_total = 0.0;
        self.paused_at = None;
    }

    pub fn tick_interval_ms(&self) -> f64 {
        self.tick_interval_ms
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn should_tick(&self, now_ms: f64) -> bool {
        !self.is_paused() && now_ms - self.last_tick >= self.tick_interval_ms
    }

    pub fn mark_tick(&mut self, now_ms: f64) {
        self.last_tick = now_ms;
    }

    /// 每累计一个加速周期的游戏时间就缩短一次 tick 间隔。每次调用最多加速一次。
    pub fn maybe_ramp_speed(&mut self, now_ms: f64) -> bool {
        if self.is_paused() || now_ms - self.last_ramp < self.ramp_interval_ms {
            return false;
        }
        self.tick_interval_ms *= self.ramp_factor;
        self.speed_multiplier = self.base_interval_ms / self.tick_interval_ms;
        self.max_speed = self.max_speed.max(self.speed_multiplier);
        self.last_ramp = now_ms;
        true
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now_ms);
        }
    }

    /// 恢复时把锚点整体后移暂停时长，暂停期间不计入加速与存活时间。
    pub fn resume(&mut self, now_ms: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = (now_ms - paused_at).max(0.0);
            self.last_tick += paused_for;
            self.last_ramp += paused_for;
            self.paused_total += paused_for;
        }
    }

    pub fn playing_ms(&self, now_ms: f64) -> f64 {
        let until = self.paused_at.unwrap_or(now_ms);
        (until - self.started_at - self.paused_total).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CountdownSignal {
    Tick { remaining: u8 },
    Go,
}

/// 开局倒计时：`steps` 次计数，随后 GO，再保持 `go_ms` 后进入游戏。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Countdown {
    steps: u8,
    step_ms: f64,
    go_ms: f64,
    started_at: f64,
    emitted: u8,
    go_emitted: bool,
}

impl Countdown {
    pub fn new(steps: u8, step_ms: f64, go_ms: f64) -> Self {
        Self {
            steps,
            step_ms,
            go_ms,
            started_at: 0.0,
            emitted: 0,
            go_emitted: false,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.started_at = now_ms;
        self.emitted = 0;
        self.go_emitted = false;
    }

    /// 推进倒计时，返回本次新产生的信号以及倒计时是否已结束。
    pub fn advance(&mut self, now_ms: f64) -> (Vec<CountdownSignal>, bool) {
        let mut signals = Vec::new();
        let elapsed = (now_ms - self.started_at).max(0.0);
        let steps_span = self.steps as f64 * self.step_ms;

        let due = ((elapsed / self.step_ms).floor() as u64)
            .saturating_add(1)
            .min(self.steps as u64) as u8;
        while self.emitted < due {
            signals.push(CountdownSignal::Tick {
                remaining: self.steps - self.emitted,
            });
            self.emitted += 1;
        }

        if elapsed >= steps_span && !self.go_emitted {
            self.go_emitted = true;
            signals.push(CountdownSignal::Go);
        }

        (signals, elapsed >= steps_span + self.go_ms)
    }

    /// 当前显示的数字；`Some(0)` 表示 GO。
    pub fn display(&self) -> Option<u8> {
        if self.go_emitted {
            Some(0)
        } else if self.emitted == 0 {
            None
        } else {
            Some(self.steps - self.emitted + 1)
        }
    }
}
