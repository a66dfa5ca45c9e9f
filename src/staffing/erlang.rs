//! Erlang B / Erlang C queueing formulas for M/M/c systems.
//!
//! # Algorithm
//! The blocking probability is built up with the recurrence
//!
//! ```text
//! B(0, a) = 1
//! B(k, a) = a·B(k−1, a) / (k + a·B(k−1, a))
//! ```
//!
//! which never forms `a^c` or `c!`, so it stays in `[0, 1]` for agent counts
//! in the tens of thousands. The waiting probability follows from
//!
//! ```text
//! C(c, a) = c·B / (c − a·(1 − B))        for c > a
//! ```
//!
//! and equals 1 whenever `c <= a` (unstable queue).
//!
//! # Reference
//! - Gross, Shortle, Thompson & Harris (2008), "Fundamentals of Queueing Theory", §2.3
//! - Koole (2013), "Call Center Optimization", ch. 4

/// Incremental Erlang-B state for a fixed offered load.
///
/// Advancing by one agent costs O(1), which keeps the staffing scan linear
/// in the final agent count.
#[derive(Debug, Clone, Copy)]
pub struct ErlangB {
    load: f64,
    agents: u32,
    blocking: f64,
}

impl ErlangB {
    /// State at zero agents (`B = 1`).
    pub fn new(load: f64) -> Self {
        Self {
            load,
            agents: 0,
            blocking: 1.0,
        }
    }

    /// Adds one agent.
    #[inline]
    pub fn advance(&mut self) {
        self.agents += 1;
        let ab = self.load * self.blocking;
        self.blocking = ab / (f64::from(self.agents) + ab);
    }

    /// Advances until `agents` servers are reached.
    pub fn advance_to(&mut self, agents: u32) {
        while self.agents < agents {
            self.advance();
        }
    }

    /// Current agent count.
    #[inline]
    pub fn agents(&self) -> u32 {
        self.agents
    }

    /// Blocking probability at the current agent count.
    #[inline]
    pub fn blocking(&self) -> f64 {
        self.blocking
    }

    /// Waiting probability (Erlang C) at the current agent count.
    pub fn waiting(&self) -> f64 {
        erlang_c_from_b(self.agents, self.load, self.blocking)
    }
}

/// Erlang-B blocking probability for `agents` servers and offered load `load`.
pub fn erlang_b(agents: u32, load: f64) -> f64 {
    let mut state = ErlangB::new(load);
    state.advance_to(agents);
    state.blocking()
}

/// Erlang-C probability that an arrival waits.
pub fn erlang_c(agents: u32, load: f64) -> f64 {
    erlang_c_from_b(agents, load, erlang_b(agents, load))
}

fn erlang_c_from_b(agents: u32, load: f64, blocking: f64) -> f64 {
    let c = f64::from(agents);
    if c <= load {
        return 1.0;
    }
    let denom = c - load * (1.0 - blocking);
    (c * blocking / denom).clamp(0.0, 1.0)
}

/// Fraction of arrivals answered within `answer_time`.
///
/// `SL = 1 − C·e^{−(cμ − λ)·t}`; with `t = 0` this is the probability of not
/// waiting at all. Rates and time share one unit.
pub fn service_level_from_c(
    waiting: f64,
    agents: u32,
    arrival_rate: f64,
    service_rate: f64,
    answer_time: f64,
) -> f64 {
    let drain = f64::from(agents) * service_rate - arrival_rate;
    if drain <= 0.0 {
        return 0.0;
    }
    (1.0 - waiting * (-drain * answer_time).exp()).clamp(0.0, 1.0)
}

/// Service level for `agents` servers.
pub fn service_level(agents: u32, arrival_rate: f64, service_rate: f64, answer_time: f64) -> f64 {
    let waiting = erlang_c(agents, arrival_rate / service_rate);
    service_level_from_c(waiting, agents, arrival_rate, service_rate, answer_time)
}

/// Mean wait over all arrivals (`C / (cμ − λ)`), infinite when unstable.
pub fn average_speed_of_answer(
    waiting: f64,
    agents: u32,
    arrival_rate: f64,
    service_rate: f64,
) -> f64 {
    let drain = f64::from(agents) * service_rate - arrival_rate;
    if drain <= 0.0 {
        f64::INFINITY
    } else {
        waiting / drain
    }
}

/// Server utilization `ρ = λ / (c·μ)`.
///
/// Zero agents yield infinity for any positive arrival rate.
pub fn utilization(arrival_rate: f64, agents: u32, service_rate: f64) -> f64 {
    let capacity = f64::from(agents) * service_rate;
    if capacity <= 0.0 {
        if arrival_rate > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        arrival_rate / capacity
    }
}
