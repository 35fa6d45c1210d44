//! Implementation of the Trickle timer defined in [RFC 6206]. The algorithm
//! allows nodes in a lossy shared medium to exchange information in a highly
//! robust, energy efficient, simple, and scalable manner. Dynamically
//! adjusting transmission windows allows Trickle to spread new information
//! fast while sending only a few messages per hour when information does not
//! change.
//!
//! **NOTE**: the default constants are the ones from the *Enhanced Trickle*
//! algorithm, which is also what Contiki uses, not the RFC 6550 defaults.
//!
//! [RFC 6206]: https://datatracker.ietf.org/doc/html/rfc6206

use crate::rand::Rand;
use crate::time::{Duration, Instant};

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrickleTimer {
    i_min: u32,
    i_max: u32,
    k: usize,

    i: Duration,
    t: Duration,
    t_exp: Instant,
    i_exp: Instant,
    counter: usize,
}

impl TrickleTimer {
    /// Create a new Trickle timer using the default values.
    ///
    /// **NOTE**: the standard defines I as a random value between
    /// [Imin, Imax]. However, this could result in a t value that is very
    /// close to Imax. Sending DIO messages would then be sporadic, which is
    /// not ideal when a network is starting up. Using Imin for I speeds up
    /// the forming of the tree and only affects its start.
    pub(crate) fn default(now: Instant, rand: &mut Rand) -> Self {
        use crate::consts::{
            DEFAULT_DIO_INTERVAL_DOUBLINGS, DEFAULT_DIO_INTERVAL_MIN,
            DEFAULT_DIO_REDUNDANCY_CONSTANT,
        };

        Self::new(
            DEFAULT_DIO_INTERVAL_MIN as u32,
            DEFAULT_DIO_INTERVAL_MIN as u32 + DEFAULT_DIO_INTERVAL_DOUBLINGS as u32,
            DEFAULT_DIO_REDUNDANCY_CONSTANT as usize,
            now,
            rand,
        )
    }

    /// Create a new Trickle timer.
    pub(crate) fn new(i_min: u32, i_max: u32, k: usize, now: Instant, rand: &mut Rand) -> Self {
        let mut timer = Self {
            i_min,
            i_max,
            k,
            i: Duration::ZERO,
            t: Duration::ZERO,
            t_exp: Instant::ZERO,
            i_exp: Instant::ZERO,
            counter: 0,
        };

        timer.i = Duration::from_millis(2u32.pow(timer.i_min) as u64);
        timer.i_exp = now + timer.i;
        timer.counter = 0;

        timer.set_t(now, rand);

        timer
    }

    /// Poll the Trickle timer. Returns `true` when a message can be
    /// transmitted, which happens when the transmission window expires.
    pub(crate) fn poll(&mut self, now: Instant, rand: &mut Rand) -> bool {
        let can_transmit = self.can_transmit() && self.t_expired(now);

        if can_transmit {
            self.set_t(now, rand);
        }

        if self.i_expired(now) {
            self.expire(now, rand);
        }

        can_transmit
    }

    /// Returns the Instant at which the Trickle timer should be polled
    /// again. Polling the timer before this Instant is not harmful, however,
    /// polling after it is not correct.
    pub(crate) fn poll_at(&self) -> Instant {
        self.t_exp.min(self.i_exp)
    }

    /// Signal the Trickle timer that a consistency has been heard, thus
    /// incrementing its counter.
    pub(crate) fn hear_consistency(&mut self) {
        self.counter += 1;
    }

    /// Signal the Trickle timer that an inconsistency has been heard. This
    /// resets the timer when the current interval is not the smallest
    /// possible.
    pub(crate) fn hear_inconsistency(&mut self, now: Instant, rand: &mut Rand) {
        let i = Duration::from_millis(2u32.pow(self.i_min) as u64);
        if self.i > i {
            self.reset(i, now, rand);
        }
    }

    /// Check if the Trickle timer can transmit. Returns `false` when the
    /// consistency counter reached the redundancy constant.
    pub(crate) fn can_transmit(&self) -> bool {
        self.k != 0 && self.counter < self.k
    }

    /// Reset the Trickle timer when the interval has expired.
    fn expire(&mut self, now: Instant, rand: &mut Rand) {
        let max_interval = Duration::from_millis(2u32.pow(self.i_max) as u64);
        let i = if self.i >= max_interval {
            max_interval
        } else {
            self.i + self.i
        };

        self.reset(i, now, rand);
    }

    pub(crate) fn reset(&mut self, i: Duration, now: Instant, rand: &mut Rand) {
        self.i = i;
        self.i_exp = now + self.i;
        self.counter = 0;
        self.set_t(now, rand);
    }

    /// Restart the timer at its smallest interval.
    pub(crate) fn restart(&mut self, now: Instant, rand: &mut Rand) {
        let i = Duration::from_millis(2u32.pow(self.i_min) as u64);
        self.reset(i, now, rand);
    }

    pub(crate) const fn max_expiration(&self) -> Duration {
        Duration::from_millis(2u64.pow(self.i_max))
    }

    pub(crate) const fn min_expiration(&self) -> Duration {
        Duration::from_millis(2u64.pow(self.i_min))
    }

    pub(crate) const fn get_i(&self) -> Duration {
        self.i
    }

    pub(crate) const fn get_t(&self) -> Duration {
        self.t
    }

    pub(crate) const fn get_counter(&self) -> usize {
        self.counter
    }

    #[cfg(test)]
    pub(crate) fn set_counter(&mut self, counter: usize) {
        self.counter = counter;
    }

    fn set_t(&mut self, now: Instant, rand: &mut Rand) {
        let t = Duration::from_micros(
            self.i.total_micros() / 2
                + (rand.rand_u32() as u64
                    % (self.i.total_micros() - self.i.total_micros() / 2 + 1)),
        );

        self.t = t;
        self.t_exp = now + t;
    }

    fn t_expired(&self, now: Instant) -> bool {
        now >= self.t_exp
    }

    fn i_expired(&self, now: Instant) -> bool {
        now >= self.i_exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trickle_timer_intervals() {
        let mut rand = Rand::new(1234);
        let mut now = Instant::ZERO;
        let mut trickle = TrickleTimer::default(now, &mut rand);

        let mut previous_i = trickle.i;

        while now <= Instant::from_secs(10_000) {
            trickle.poll(now, &mut rand);

            if now < Instant::ZERO + trickle.max_expiration() {
                // t should always be in between I/2 and I.
                assert!(trickle.i / 2 < trickle.t);
                assert!(trickle.i > trickle.t);
            }

            if previous_i != trickle.i {
                // When a new interval is selected, it should be double the
                // previous one, and the counter is reset.
                assert_eq!(previous_i * 2, trickle.i);
                assert_eq!(trickle.counter, 0);
                previous_i = trickle.i;
            }

            now += Duration::from_millis(100);
        }
    }

    #[test]
    fn trickle_timer_hear_inconsistency() {
        let mut rand = Rand::new(1234);
        let mut now = Instant::ZERO;
        let mut trickle = TrickleTimer::default(now, &mut rand);

        trickle.counter = 1;

        while now <= Instant::from_secs(10_000) {
            trickle.poll(now, &mut rand);

            if now == Instant::from_secs(10) {
                trickle.counter = 1;

                trickle.hear_inconsistency(now, &mut rand);

                assert_eq!(trickle.counter, 0);
                assert_eq!(trickle.i, trickle.min_expiration());
            }

            now += Duration::from_millis(100);
        }
    }

    #[test]
    fn trickle_timer_hear_consistency() {
        let mut rand = Rand::new(1234);
        let mut now = Instant::ZERO;
        let mut trickle = TrickleTimer::default(now, &mut rand);

        trickle.counter = 1;

        let mut transmit_counter = 0;

        while now <= Instant::from_secs(10_000) {
            trickle.hear_consistency();

            if trickle.poll(now, &mut rand) {
                transmit_counter += 1;
            }

            if now == Instant::from_secs(10_000) {
                use crate::consts::DEFAULT_DIO_REDUNDANCY_CONSTANT;
                assert!(!trickle.poll(now, &mut rand));
                assert!(trickle.counter > DEFAULT_DIO_REDUNDANCY_CONSTANT as usize);
                // We should never have transmitted, since the counter was
                // always higher than the redundancy constant.
                assert_eq!(transmit_counter, 0);
            }

            now += Duration::from_millis(100);
        }
    }
}
