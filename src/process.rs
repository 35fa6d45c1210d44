//! The message handlers. Each handler runs to completion, mutates the
//! instance/DODAG/parent/route state and queues any messages it needs to
//! send; nothing suspends mid-handler. The host drains the queue with
//! [`Rpl::poll_transmit`] and keeps the clock moving by calling
//! [`Rpl::poll`] no later than [`Rpl::poll_at`].

use crate::consts::*;
use crate::dag::{Dodag, PrefixInfo};
use crate::instance::Instance;
use crate::neighbors::AdmissionReason;
use crate::of::{ObjectiveFunction, TransmissionStatus};
use crate::parents::Parent;
use crate::rank::Rank;
use crate::routes::RouteFlags;
use crate::time::{Duration, Instant};
use crate::trickle::TrickleTimer;
use crate::wire::rpl::options::{self, Repr as OptionRepr};
use crate::wire::rpl::{Dao, DaoAck, Dco, DcoAck, Dio, Dis};
use crate::wire::{Icmpv6Packet, Ipv6Address, RplRepr, SequenceCounter};
use crate::{Rpl, Transmit};

/// Expand the prefix bytes of a target option into a full address.
fn prefix_address(prefix: &[u8]) -> Ipv6Address {
    let mut bytes = [0u8; 16];
    let len = prefix.len().min(16);
    bytes[..len].copy_from_slice(&prefix[..len]);
    Ipv6Address(bytes)
}

impl Rpl {
    /// Ingest the ICMPv6 payload of a received RPL control message.
    ///
    /// `src_addr` and `dst_addr` are the addresses of the enclosing IPv6
    /// header; both steer the handlers (unicast replies go to the source,
    /// multicast reception feeds the trickle timer).
    pub fn process_icmp(
        &mut self,
        now: Instant,
        src_addr: Ipv6Address,
        dst_addr: Ipv6Address,
        payload: &[u8],
    ) {
        let packet = match Icmpv6Packet::new_checked(payload) {
            Ok(packet) => packet,
            Err(_) => {
                self.stats.malformed_msgs += 1;
                return;
            }
        };

        let repr = match RplRepr::parse(&packet) {
            Ok(repr) => repr,
            Err(_) => {
                self.stats.malformed_msgs += 1;
                return;
            }
        };

        self.process(now, src_addr, dst_addr, &repr);
    }

    /// Dispatch a parsed RPL control message to its handler.
    pub fn process(
        &mut self,
        now: Instant,
        src_addr: Ipv6Address,
        dst_addr: Ipv6Address,
        repr: &RplRepr,
    ) {
        net_trace!("receiving {}", repr);

        match repr {
            RplRepr::DodagInformationSolicitation(dis) => {
                self.process_dis(now, src_addr, dst_addr, dis)
            }
            RplRepr::DodagInformationObject(dio) => self.process_dio(now, src_addr, dio),
            RplRepr::DestinationAdvertisementObject(dao) => self.process_dao(now, src_addr, dao),
            RplRepr::DestinationAdvertisementObjectAck(ack) => {
                self.process_dao_ack(now, src_addr, ack)
            }
            RplRepr::DestinationCleanupObject(dco) => self.process_dco(src_addr, dco),
            RplRepr::DestinationCleanupObjectAck(ack) => self.process_dco_ack(src_addr, ack),
        }
    }

    // === DIS ===

    fn process_dis(
        &mut self,
        now: Instant,
        src_addr: Ipv6Address,
        dst_addr: Ipv6Address,
        dis: &Dis,
    ) {
        self.stats.dis_recvd += 1;

        for opt in &dis.options {
            match opt {
                OptionRepr::Pad1 | OptionRepr::PadN(_) => (),
                // The Solicited Information option filters who answers, see
                // RFC 6550 § 8.3. A node matching all predicates handles
                // the DIS; anyone else stays quiet.
                OptionRepr::SolicitedInformation(info) => {
                    let Some(dodag) = &self.instance.dodag else {
                        return;
                    };

                    if (info.version_predicate
                        && dodag.version_number.value() != info.version_number.value())
                        || (info.instance_id_predicate && self.instance.id != info.rpl_instance_id)
                        || (info.dodag_id_predicate && dodag.id != info.dodag_id)
                    {
                        net_trace!("solicited information mismatch, staying quiet");
                        return;
                    }
                }
                _ => net_trace!("received invalid option in DIS"),
            }
        }

        if dst_addr.is_multicast() {
            if self.leaf_only {
                net_trace!("leaf mode, multicast DIS does not reset the DIO timer");
            } else if let Some(dodag) = self.instance.dodag.as_mut() {
                net_trace!("multicast DIS, resetting DIO timer");
                dodag.dio_timer.hear_inconsistency(now, &mut self.rand);
            }
        } else {
            if !self.neighbors.admit(src_addr, AdmissionReason::Dis, now) {
                net_debug!("out of neighbor slots, not answering DIS from {}", src_addr);
                return;
            }

            net_trace!("unicast DIS, replying with unicast DIO");
            self.dio_output(Some(src_addr));
        }
    }

    /// Queue a DIS. Without an address it goes to the link-local all RPL
    /// nodes multicast group.
    pub fn dis_output(&mut self, addr: Option<Ipv6Address>) {
        let dst_addr = addr.unwrap_or(Ipv6Address::LINK_LOCAL_ALL_RPL_NODES);

        net_trace!("sending DIS to {}", dst_addr);

        self.transmit(
            dst_addr,
            RplRepr::DodagInformationSolicitation(Dis {
                options: Default::default(),
            }),
        );
    }

    // === DIO ===

    fn process_dio(&mut self, now: Instant, src_addr: Ipv6Address, dio: &Dio) {
        self.stats.dio_recvd += 1;

        if dio.rpl_instance_id != self.instance.id {
            net_trace!("ignoring DIO for unknown instance {:?}", dio.rpl_instance_id);
            return;
        }

        let mut dodag_conf = None;
        let mut prefix_info = None;
        let mut metric = None;

        for opt in &dio.options {
            match opt {
                OptionRepr::Pad1 | OptionRepr::PadN(_) => (),
                OptionRepr::DodagConfiguration(conf) => dodag_conf = Some(conf),
                OptionRepr::DagMetricContainer(mc) => metric = Some(mc.object),
                OptionRepr::PrefixInformation(info) => {
                    prefix_info = Some(PrefixInfo {
                        prefix: info.destination_prefix,
                        length: info.prefix_length,
                        on_link: info.on_link,
                        autonomous_address_configuration: info.autonomous_address_configuration,
                        lifetime: info.preferred_lifetime,
                    });
                }
                OptionRepr::RouteInformation(_) => {
                    net_trace!("route information option not supported");
                }
                _ => net_trace!("received invalid option in DIO"),
            }
        }

        // When the configuration option is absent, the values already in
        // force apply.
        let ocp = dodag_conf
            .map(|conf| conf.objective_code_point)
            .unwrap_or(self.instance.dodag_conf.objective_code_point);

        // A DIO advertising another mode of operation, or an objective
        // function we cannot run, describes a DODAG we cannot take part in.
        if dio.mode_of_operation != self.instance.mode_of_operation {
            net_trace!("ignoring DIO advertising another mode of operation");
            return;
        }

        if self.is_root {
            self.process_dio_as_root(now, dio);
            return;
        }

        let joined = self.instance.dodag.is_some();
        if joined && ocp != self.instance.of.ocp() {
            net_trace!("ignoring DIO advertising OCP {}", ocp);
            return;
        }
        if !joined && ObjectiveFunction::from_ocp(ocp).is_none() {
            net_trace!("ignoring DIO advertising unsupported OCP {}", ocp);
            return;
        }

        let same_dodag = self.instance.dodag.as_ref().map(|dodag| dodag.id == dio.dodag_id);

        match same_dodag {
            None => {
                if dio.rank == Rank::INFINITE.raw_value() {
                    // Not a DODAG one can join through.
                    return;
                }

                self.join_dodag(now, dio, dodag_conf, prefix_info);
                self.update_parent(now, src_addr, dio, metric);
            }
            Some(true) => {
                // The configuration and prefix information options
                // propagate down the DODAG unchanged.
                if let Some(conf) = dodag_conf {
                    self.instance.dodag_conf = conf.into();
                }
                if let Some(info) = prefix_info {
                    if let Some(dodag) = self.instance.dodag.as_mut() {
                        dodag.prefix_info = Some(info);
                    }
                }

                self.update_parent(now, src_addr, dio, metric);
            }
            Some(false) => {
                // A DIO for another DODAG of our instance: a candidate. It
                // only wins when the objective function prefers it.
                if dio.rank == Rank::INFINITE.raw_value() {
                    return;
                }

                let candidate_rank = Rank::new(
                    dio.rank,
                    dodag_conf
                        .map(|conf| conf.minimum_hop_rank_increase)
                        .unwrap_or(self.instance.dodag_conf.minimum_hop_rank_increase),
                );

                let candidate = Dodag {
                    id: dio.dodag_id,
                    version_number: dio.version_number,
                    rank: candidate_rank,
                    grounded: dio.grounded,
                    preference: dio.dodag_preference,
                    joined: false,
                    prefix_info: None,
                    parents: Default::default(),
                    preferred_parent: None,
                    dio_timer: TrickleTimer::default(now, &mut self.rand),
                };

                let switch = {
                    let current = self.instance.dodag.as_ref().unwrap();
                    self.instance.of.best_dag(current, &candidate).id == candidate.id
                };

                if switch {
                    net_debug!("switching to preferred DODAG {}", dio.dodag_id);
                    self.instance.dodag = None;
                    self.routes.clear();
                    self.join_dodag(now, dio, dodag_conf, prefix_info);
                    self.update_parent(now, src_addr, dio, metric);
                }
            }
        }
    }

    fn process_dio_as_root(&mut self, now: Instant, dio: &Dio) {
        let Some(dodag) = self.instance.dodag.as_mut() else {
            return;
        };

        if dio.dodag_id != dodag.id {
            return;
        }

        if dio.version_number.value() != dodag.version_number.value() {
            // A stale version is circulating below us.
            dodag.dio_timer.hear_inconsistency(now, &mut self.rand);
        } else if dio.rank != Rank::INFINITE.raw_value() {
            dodag.dio_timer.hear_consistency();
        }
    }

    fn join_dodag(
        &mut self,
        now: Instant,
        dio: &Dio,
        dodag_conf: Option<&options::DodagConfiguration>,
        prefix_info: Option<PrefixInfo>,
    ) {
        if let Some(conf) = dodag_conf {
            self.instance.update_dodag_conf(conf);
        }

        let conf = &self.instance.dodag_conf;

        net_debug!(
            "joining DODAG {} version {}",
            dio.dodag_id,
            dio.version_number
        );

        let dio_timer = TrickleTimer::new(
            conf.dio_interval_min as u32,
            conf.dio_interval_min as u32 + conf.dio_interval_doublings as u32,
            conf.dio_redundancy_constant as usize,
            now,
            &mut self.rand,
        );

        self.instance.dodag = Some(Dodag {
            id: dio.dodag_id,
            version_number: dio.version_number,
            rank: Rank::new(
                u16::MAX,
                self.instance.dodag_conf.minimum_hop_rank_increase,
            ),
            grounded: dio.grounded,
            preference: dio.dodag_preference,
            joined: true,
            prefix_info,
            parents: Default::default(),
            preferred_parent: None,
            dio_timer,
        });
    }

    /// The common tail of DIO processing: maintain the parent set entry of
    /// the sender, re-run the parent election, and feed the trickle timer.
    fn update_parent(
        &mut self,
        now: Instant,
        src_addr: Ipv6Address,
        dio: &Dio,
        metric: Option<options::MetricObject>,
    ) {
        let min_hop_rank_increase = self.instance.dodag_conf.minimum_hop_rank_increase;
        let dio_rank = Rank::new(dio.rank, min_hop_rank_increase);

        let Some(dodag) = self.instance.dodag.as_mut() else {
            return;
        };

        if dio.version_number.value() != dodag.version_number.value() {
            if dio.version_number.greater_than(&dodag.version_number) {
                // The root moved the DODAG to a new version; take part in
                // it from scratch.
                net_debug!("DODAG version moved to {}", dio.version_number);
                dodag.version_number = dio.version_number;
                dodag.parents.clear();
                dodag.detach();
                dodag.dio_timer.restart(now, &mut self.rand);
            } else {
                net_trace!("ignoring DIO with stale version number");
                return;
            }
        }

        if dio_rank.is_infinite() {
            // The sender poisoned itself; it is no parent for anyone.
            let was_preferred = dodag.preferred_parent == Some(src_addr);
            dodag.parents.remove(&src_addr);

            if was_preferred {
                net_debug!("preferred parent advertised infinite rank");
                dodag.dio_timer.hear_inconsistency(now, &mut self.rand);
                self.update_preferred_parent(now);

                if !self.has_parent() {
                    // Poison our own sub-DODAG and look for a new place to
                    // attach.
                    self.dio_output(None);
                    self.dis_expiration =
                        now + Duration::from_secs(DIS_START_DELAY as u64);
                }
            }
            return;
        }

        if !self.neighbors.admit(src_addr, AdmissionReason::Dio, now) {
            net_debug!("out of neighbor slots, ignoring DIO from {}", src_addr);
            return;
        }

        dodag.grounded = dio.grounded;
        dodag.preference = dio.dodag_preference;

        let mut schedule_dao = false;

        match dodag.parents.find_mut(&src_addr) {
            Some(parent) => {
                // A DTSN increment of the preferred parent solicits a
                // refresh of the downward routes through us.
                if dodag.preferred_parent == Some(src_addr)
                    && dio.dtsn.greater_than(&parent.dtsn)
                {
                    net_debug!("preferred parent incremented DTSN, scheduling DAO");
                    schedule_dao = true;
                }

                parent.rank = dio_rank;
                parent.preference = dio.dodag_preference;
                parent.dtsn = dio.dtsn;
                parent.metric = metric;
                parent.last_heard = now;
            }
            None => {
                let mut parent =
                    Parent::new(src_addr, dio_rank, dio.dodag_preference, dio.dtsn, now);
                parent.metric = metric;
                dodag.parents.add(parent);
            }
        }

        let expiration = dodag.dio_timer.max_expiration() * 2;
        dodag.parents.purge(now, expiration);
        self.neighbors.purge(now, expiration);

        if schedule_dao {
            self.instance.dao_expiration =
                Some(now + Duration::from_millis(DAO_LATENCY_MILLIS));
        }

        self.update_preferred_parent(now);

        // A consistent DIO from our preferred parent suppresses our own
        // transmissions.
        if let Some(dodag) = self.instance.dodag.as_mut() {
            if dodag.preferred_parent == Some(src_addr)
                && dodag
                    .parents
                    .find(&src_addr)
                    .map(|parent| parent.rank.dag_rank())
                    == Some(dio_rank.dag_rank())
            {
                dodag.dio_timer.hear_consistency();
            }
        }
    }

    /// Re-run the preferred parent election and recompute the Rank. A
    /// parent switch resets the trickle timer and schedules a fresh DAO; a
    /// switch away from an old parent also tells it we are gone.
    fn update_preferred_parent(&mut self, now: Instant) {
        let mut withdraw_through = None;

        {
            let Instance {
                of,
                dodag,
                dodag_conf,
                dao_expiration,
                ..
            } = &mut self.instance;

            let Some(dodag) = dodag.as_mut() else {
                return;
            };

            let min_hop_rank_increase = dodag_conf.minimum_hop_rank_increase;

            let previous = dodag.preferred_parent;
            let elected =
                of.preferred_parent(&dodag.parents, previous.as_ref(), min_hop_rank_increase);

            dodag.set_preferred_parent(elected);

            match dodag.preferred_parent {
                Some(address) => {
                    let parent = dodag.parents.find(&address);
                    let rank = of.calculate_rank(parent, 0, min_hop_rank_increase);
                    dodag.rank = Rank::new(rank, min_hop_rank_increase);

                    if previous != Some(address) {
                        net_debug!(
                            "preferred parent is now {}, rank {}",
                            address,
                            dodag.rank
                        );
                        dodag.dio_timer.hear_inconsistency(now, &mut self.rand);
                        *dao_expiration =
                            Some(now + Duration::from_millis(DAO_LATENCY_MILLIS));

                        // Withdraw our registration through the old parent.
                        withdraw_through = previous;
                    }
                }
                None => {
                    if previous.is_some() {
                        net_debug!("no parent left, detaching");
                    }
                    dodag.detach();
                }
            }
        }

        if let (Some(old), Some(prefix)) = (withdraw_through, self.global_address) {
            self.dao_output_no_path(old, prefix);
        }
    }

    /// Queue a DIO. Without an address it goes to the link-local all RPL
    /// nodes multicast group, driven by the trickle timer.
    pub fn dio_output(&mut self, uc_addr: Option<Ipv6Address>) {
        if self.instance.dodag.is_none() {
            return;
        }

        // In leaf mode only unicast replies are sent, and they advertise
        // the infinite rank: a leaf extends no DODAG.
        if self.leaf_only && uc_addr.is_none() {
            net_trace!("leaf mode, skipping multicast DIO");
            return;
        }

        if self.dio_refresh_dao_routes && self.is_root && uc_addr.is_none() {
            // Request fresh DAOs to refresh the downward routes. Not done
            // for unicast DIOs, to avoid DAO bursts after DIS probing.
            self.instance.dtsn_out.increment();
        }

        let instance = &self.instance;
        let dodag = instance.dodag.as_ref().unwrap();

        let mut options = heapless::Vec::new();

        if let Some(object) = instance.of.metric_object(
            instance.metric_container,
            self.is_root,
            dodag.preferred_parent(),
        ) {
            let _ = options.push(OptionRepr::DagMetricContainer(
                options::DagMetricContainer {
                    flags: DAG_MC_FLAG_P,
                    aggregated: 0,
                    precedence: 0,
                    object,
                },
            ));
        }

        // Always include a DODAG configuration option.
        let _ = options.push(instance.dodag_conf.to_option());

        if let Some(info) = &dodag.prefix_info {
            let _ = options.push(OptionRepr::PrefixInformation(options::PrefixInformation {
                prefix_length: info.length,
                on_link: info.on_link,
                autonomous_address_configuration: info.autonomous_address_configuration,
                router_address: false,
                valid_lifetime: info.lifetime,
                preferred_lifetime: info.lifetime,
                destination_prefix: info.prefix,
            }));
        }

        let rank = if self.leaf_only {
            Rank::INFINITE.raw_value()
        } else {
            dodag.rank.raw_value()
        };

        let dio = RplRepr::DodagInformationObject(Dio {
            rpl_instance_id: instance.id,
            version_number: dodag.version_number,
            rank,
            grounded: dodag.grounded,
            mode_of_operation: instance.mode_of_operation,
            dodag_preference: dodag.preference,
            dtsn: instance.dtsn_out,
            dodag_id: dodag.id,
            options,
        });

        let dst_addr = uc_addr.unwrap_or(Ipv6Address::LINK_LOCAL_ALL_RPL_NODES);

        net_trace!("sending DIO to {}", dst_addr);
        self.stats.dio_sent += 1;
        self.transmit(dst_addr, dio);
    }

    // === DAO ===

    fn process_dao(&mut self, now: Instant, src_addr: Ipv6Address, dao: &Dao) {
        self.stats.dao_recvd += 1;

        if dao.rpl_instance_id != self.instance.id {
            net_trace!("ignoring DAO for unknown instance {:?}", dao.rpl_instance_id);
            return;
        }

        if self.instance.is_storing() {
            self.process_dao_storing(now, src_addr, dao);
        } else if self.instance.is_non_storing() {
            self.process_dao_nonstoring(now, src_addr, dao);
        } else {
            net_trace!("no downward routes maintained, ignoring DAO");
        }
    }

    fn process_dao_storing(&mut self, now: Instant, src_addr: Ipv6Address, dao: &Dao) {
        let Some(dodag) = self.instance.dodag.as_mut() else {
            return;
        };

        if let Some(dodag_id) = dao.dodag_id {
            if dodag_id != dodag.id {
                net_trace!("ignoring DAO for a DAG different from ours");
                return;
            }
        }

        let sequence = dao.sequence.value();
        let expect_ack = dao.expect_ack;
        let is_root = self.is_root;
        let learned_from_unicast = !src_addr.is_multicast();

        if learned_from_unicast {
            // A DAO coming from above is a forwarding loop: either the
            // sender advertises a rank lower than ours, or it is our own
            // preferred parent.
            let our_rank = dodag.rank;
            let from_preferred = dodag.preferred_parent == Some(src_addr);

            if let Some(parent) = dodag.parents.find_mut(&src_addr) {
                if parent.rank.dag_rank() < our_rank.dag_rank() || from_preferred {
                    net_debug!("loop detected, poisoning parent {}", src_addr);
                    parent.poison();
                    return;
                }
            }
        }

        let mut target = None;
        let mut lifetime = self.instance.dodag_conf.default_lifetime;
        let mut path_sequence = 0;

        for opt in &dao.options {
            match opt {
                OptionRepr::Pad1 | OptionRepr::PadN(_) => (),
                OptionRepr::RplTarget(t) => {
                    target = Some((prefix_address(&t.prefix), t.prefix_length));
                }
                OptionRepr::TransitInformation(t) => {
                    path_sequence = t.path_sequence;
                    lifetime = t.path_lifetime;
                }
                _ => net_trace!("received invalid option in DAO"),
            }
        }

        let Some((prefix, prefix_len)) = target else {
            self.stats.malformed_msgs += 1;
            return;
        };

        if prefix.is_multicast() {
            net_trace!("multicast targets not supported");
            return;
        }

        net_trace!(
            "DAO lifetime {} for {}/{} from {}",
            lifetime,
            prefix,
            prefix_len,
            src_addr
        );

        if lifetime == ZERO_LIFETIME {
            self.stats.dao_recvd -= 1;
            self.stats.npdao_recvd += 1;
            self.process_no_path_dao(src_addr, dao, prefix, prefix_len, path_sequence);
            return;
        }

        if !self.neighbors.admit(src_addr, AdmissionReason::Dao, now) {
            net_debug!("out of neighbor slots, dropping DAO from {}", src_addr);
            if expect_ack {
                self.dao_ack_output(src_addr, sequence, self.unable_to_accept_status());
            }
            return;
        }

        // A next hop change means the target moved: the path through the
        // previous next hop is stale and will be cleaned up with a DCO.
        let previous_next_hop = self
            .routes
            .lookup(&prefix, prefix_len)
            .map(|route| route.next_hop);

        let lifetime_secs = self.instance.lifetime_secs(lifetime);
        let parent_above = self.preferred_parent_address();

        let mut installed = false;
        let mut should_ack = false;
        let mut forward = None;

        if let Some(route) = self.routes.add(prefix, prefix_len, src_addr, lifetime_secs) {
            installed = true;
            route.dao_path_sequence = path_sequence;
            route.flags.remove(RouteFlags::NOPATH_RECEIVED);

            if learned_from_unicast {
                // A route already installed with a matching sequence takes
                // no extra room: acknowledging is safe. The root
                // acknowledges unconditionally.
                if expect_ack
                    && ((!route.is_dao_pending() && route.dao_seqno_in == sequence) || is_root)
                {
                    should_ack = true;
                }

                if parent_above.is_some() {
                    if route.is_dao_pending() && route.dao_seqno_in == sequence {
                        // A retransmission from below reuses the recorded
                        // outgoing sequence.
                        forward = Some(route.dao_seqno_out);
                    } else {
                        forward = Some(prepare_for_dao_fwd(&mut self.instance, route, sequence));
                    }
                }
            }
        }

        if !installed {
            self.stats.mem_overflows += 1;
            net_debug!("could not add route after receiving DAO");
            if expect_ack {
                self.dao_ack_output(src_addr, sequence, self.unable_to_accept_status());
            }
            return;
        }

        if !learned_from_unicast {
            return;
        }

        if let (Some(out_sequence), Some(parent)) = (forward, parent_above) {
            net_trace!(
                "forwarding DAO to parent {}, in seq {} out seq {}",
                parent,
                sequence,
                out_sequence
            );
            let fwd = self.build_dao(
                prefix,
                prefix_len,
                lifetime,
                path_sequence,
                SequenceCounter::new(out_sequence),
                expect_ack,
                None,
            );
            self.stats.dao_forwarded += 1;
            self.transmit(parent, fwd);
        }

        if should_ack {
            self.dao_ack_output(src_addr, sequence, DAO_ACK_UNCONDITIONAL_ACCEPT);
        }

        if self.with_dco {
            if let Some(previous) = previous_next_hop {
                if previous != src_addr {
                    net_debug!("next hop changed, cleaning up through {}", previous);
                    self.dco_output(prefix, previous, path_sequence);
                }
            }
        }
    }

    /// A No-Path DAO announces the loss of a target below. The matching
    /// route lingers shortly for in-flight datagrams, and the withdrawal
    /// travels further up with a fresh sequence number.
    fn process_no_path_dao(
        &mut self,
        src_addr: Ipv6Address,
        dao: &Dao,
        prefix: Ipv6Address,
        prefix_len: u8,
        path_sequence: u8,
    ) {
        let sequence = dao.sequence.value();
        let parent_above = self.preferred_parent_address();

        let mut forward = None;

        if let Some(route) = self.routes.lookup_mut(&prefix, prefix_len) {
            if !route.is_nopath_received() && route.next_hop == src_addr {
                net_trace!("setting expiration timer for {}/{}", prefix, prefix_len);
                route.flags |= RouteFlags::NOPATH_RECEIVED;
                route.lifetime = NOPATH_REMOVAL_DELAY;

                if parent_above.is_some() {
                    forward = Some(prepare_for_dao_fwd(&mut self.instance, route, sequence));
                }
            }
        }

        if let (Some(out_sequence), Some(parent)) = (forward, parent_above) {
            net_trace!("forwarding No-Path DAO to parent, out seq {}", out_sequence);
            let fwd = self.build_dao(
                prefix,
                prefix_len,
                ZERO_LIFETIME,
                path_sequence,
                SequenceCounter::new(out_sequence),
                dao.expect_ack,
                None,
            );
            self.stats.npdao_forwarded += 1;
            self.transmit(parent, fwd);
        }

        // Whether the route was removed or not, the request is answered.
        if dao.expect_ack {
            self.dao_ack_output(src_addr, sequence, DAO_ACK_UNCONDITIONAL_ACCEPT);
        }
    }

    fn process_dao_nonstoring(&mut self, now: Instant, src_addr: Ipv6Address, dao: &Dao) {
        if let Some(dodag) = self.instance.dodag.as_ref() {
            if let Some(dodag_id) = dao.dodag_id {
                if dodag_id != dodag.id {
                    net_trace!("ignoring DAO for a DAG different from ours");
                    return;
                }
            }
        }

        let mut target = None;
        let mut parent_address = None;
        let mut lifetime = self.instance.dodag_conf.default_lifetime;

        for opt in &dao.options {
            match opt {
                OptionRepr::Pad1 | OptionRepr::PadN(_) => (),
                OptionRepr::RplTarget(t) => {
                    target = Some((prefix_address(&t.prefix), t.prefix_length));
                }
                OptionRepr::TransitInformation(t) => {
                    lifetime = t.path_lifetime;
                    parent_address = t.parent_address;
                }
                _ => net_trace!("received invalid option in DAO"),
            }
        }

        // In non-storing mode the parent address in the transit option is
        // what links the target into the source-route graph; without it
        // the advertisement is meaningless.
        let (Some((prefix, _)), Some(parent)) = (target, parent_address) else {
            self.stats.malformed_msgs += 1;
            return;
        };

        if lifetime == ZERO_LIFETIME {
            self.stats.dao_recvd -= 1;
            self.stats.npdao_recvd += 1;
            net_trace!("No-Path DAO, expiring {} via {}", prefix, parent);
            self.relations.expire(&prefix, &parent);
        } else {
            let lifetime_secs = self.instance.lifetime_secs(lifetime);
            if !self.relations.update(
                prefix,
                parent,
                now,
                Duration::from_secs(lifetime_secs as u64),
            ) {
                self.stats.mem_overflows += 1;
                net_debug!("failed to add link {} via {}", prefix, parent);
                return;
            }
        }

        if dao.expect_ack {
            self.dao_ack_output(src_addr, dao.sequence.value(), DAO_ACK_UNCONDITIONAL_ACCEPT);
        }
    }

    /// Advertise our own target upward, starting the acknowledgement
    /// bookkeeping when one is expected.
    pub fn dao_output(&mut self, now: Instant, lifetime: u8) {
        let Some(prefix) = self.global_address else {
            net_trace!("no global address set, suppressing DAO");
            return;
        };

        if self.preferred_parent_address().is_none() {
            return;
        }

        self.instance.dao_sequence.increment();
        self.instance.path_sequence.increment();
        let sequence = self.instance.dao_sequence.value();

        if self.with_dao_ack && lifetime != ZERO_LIFETIME {
            // This is the first transmission; retransmissions go through
            // the timer with the same sequence number.
            self.instance.my_dao_seqno = sequence;
            self.instance.my_dao_transmissions = 1;
            self.instance.dao_retransmit_at =
                Some(now + Duration::from_millis(DAO_RETRANSMISSION_TIMEOUT_MILLIS));
        } else if !self.with_dao_ack {
            // We tried to register, so assume there is a downward route
            // unless this was a withdrawal.
            self.instance.has_downward_route = lifetime != ZERO_LIFETIME;
        }

        self.dao_output_target_seq(prefix, lifetime, sequence);
    }

    /// Advertise a target upward with the current sequence number.
    pub fn dao_output_target(&mut self, prefix: Ipv6Address, lifetime: u8) {
        let sequence = self.instance.dao_sequence.value();
        self.dao_output_target_seq(prefix, lifetime, sequence);
    }

    fn dao_output_target_seq(&mut self, prefix: Ipv6Address, lifetime: u8, sequence: u8) {
        let Some(parent) = self.preferred_parent_address() else {
            net_trace!("no parent, suppressing DAO");
            return;
        };

        let (dst_addr, transit_parent) = {
            let instance = &self.instance;
            let dodag = instance.dodag.as_ref().unwrap();

            if instance.is_non_storing() {
                // The DAO travels to the root; the transit option names the
                // parent by its global address, built from the DODAG prefix
                // and the parent's interface identifier.
                let mut parent_global = [0u8; 16];
                parent_global[..8].copy_from_slice(&dodag.id.0[..8]);
                parent_global[8..].copy_from_slice(&parent.0[8..]);
                (dodag.id, Some(Ipv6Address(parent_global)))
            } else {
                (parent, None)
            }
        };

        let expect_ack = self.with_dao_ack && lifetime != ZERO_LIFETIME;
        let dao = self.build_dao(
            prefix,
            128,
            lifetime,
            self.instance.path_sequence.value(),
            SequenceCounter::new(sequence),
            expect_ack,
            transit_parent,
        );

        net_trace!(
            "sending a {}DAO with sequence {} for {} to {}",
            if lifetime == ZERO_LIFETIME {
                "No-Path "
            } else {
                ""
            },
            sequence,
            prefix,
            dst_addr
        );

        if lifetime == ZERO_LIFETIME {
            self.stats.npdao_sent += 1;
        } else {
            self.stats.dao_sent += 1;
        }

        self.transmit(dst_addr, dao);
    }

    /// Withdraw our registration through a specific (old) parent.
    fn dao_output_no_path(&mut self, parent: Ipv6Address, prefix: Ipv6Address) {
        self.instance.dao_sequence.increment();
        let sequence = self.instance.dao_sequence.value();

        let dao = self.build_dao(
            prefix,
            128,
            ZERO_LIFETIME,
            self.instance.path_sequence.value(),
            SequenceCounter::new(sequence),
            false,
            None,
        );

        self.stats.npdao_sent += 1;
        self.transmit(parent, dao);
    }

    #[allow(clippy::too_many_arguments)]
    fn build_dao(
        &self,
        prefix: Ipv6Address,
        prefix_len: u8,
        lifetime: u8,
        path_sequence: u8,
        sequence: SequenceCounter,
        expect_ack: bool,
        transit_parent: Option<Ipv6Address>,
    ) -> RplRepr {
        let mut options = heapless::Vec::new();

        let _ = options.push(OptionRepr::RplTarget(options::RplTarget {
            prefix_length: prefix_len,
            prefix: heapless::Vec::from_slice(
                &prefix.as_bytes()[..(prefix_len as usize + 7) / 8],
            )
            .unwrap(),
        }));

        let _ = options.push(OptionRepr::TransitInformation(
            options::TransitInformation {
                external: false,
                path_control: 0,
                path_sequence,
                path_lifetime: lifetime,
                parent_address: transit_parent,
            },
        ));

        RplRepr::DestinationAdvertisementObject(Dao {
            rpl_instance_id: self.instance.id,
            expect_ack,
            sequence,
            dodag_id: None,
            options,
        })
    }

    // === DAO-ACK ===

    fn process_dao_ack(&mut self, now: Instant, src_addr: Ipv6Address, ack: &DaoAck) {
        self.stats.dao_ack_recvd += 1;

        if !self.with_dao_ack {
            return;
        }

        if ack.rpl_instance_id != self.instance.id {
            return;
        }

        let sequence = ack.sequence.value();
        let status = ack.status;

        if self.instance.is_storing() {
            // In storing mode acknowledgements travel hop by hop; one from
            // a node that is not a parent of ours is not for us.
            let known = self
                .instance
                .dodag
                .as_ref()
                .is_some_and(|dodag| dodag.parents.find(&src_addr).is_some());
            if !known {
                net_trace!("ignoring DAO-ACK from unknown parent {}", src_addr);
                return;
            }
        }

        net_trace!(
            "received a DAO {} with sequence {} ({}) and status {} from {}",
            if status < 128 { "ACK" } else { "NACK" },
            sequence,
            self.instance.my_dao_seqno,
            status,
            src_addr
        );

        if sequence == self.instance.my_dao_seqno {
            self.instance.has_downward_route = status < 128;

            // Always stop the retransmission timer when the ACK arrives.
            self.instance.dao_retransmit_at = None;

            if self.instance.is_storing() {
                let Instance { of, dodag, .. } = &mut self.instance;
                if let Some(parent) = dodag
                    .as_mut()
                    .and_then(|dodag| dodag.parents.find_mut(&src_addr))
                {
                    of.dao_ack_callback(parent, status);
                }
            }

            if self.repair_on_dao_nack && status >= DAO_ACK_UNABLE_TO_ACCEPT {
                // Our registration cannot get in; detach and rebuild.
                self.local_repair(now);
            }
        } else if self.instance.is_storing() {
            // Not ours: an acknowledgement for a DAO we forwarded earlier.
            // Hand it down with the sequence number the originator used.
            let mut forward_to = None;

            if let Some(route) = self.routes.find_by_dao_seqno_out(sequence) {
                route.flags.remove(RouteFlags::DAO_PENDING);
                forward_to = Some((route.next_hop, route.dao_seqno_in, route.prefix()));
            }

            let Some((next_hop, seqno_in, (prefix, prefix_len))) = forward_to else {
                net_trace!(
                    "no route entry found to forward DAO-ACK (sequence {})",
                    sequence
                );
                return;
            };

            net_trace!("forwarding DAO-ACK to {}", next_hop);
            self.dao_ack_output(next_hop, seqno_in, status);

            if status >= DAO_ACK_UNABLE_TO_ACCEPT {
                // The target never made it into the tables above us.
                self.routes.remove(&prefix, prefix_len);
            }
        }
    }

    pub(crate) fn dao_ack_output(&mut self, dst_addr: Ipv6Address, sequence: u8, status: u8) {
        if !self.with_dao_ack {
            return;
        }

        net_trace!(
            "sending a DAO {} with sequence {} to {}",
            if status < 128 { "ACK" } else { "NACK" },
            sequence,
            dst_addr
        );

        self.transmit(
            dst_addr,
            RplRepr::DestinationAdvertisementObjectAck(DaoAck {
                rpl_instance_id: self.instance.id,
                sequence: SequenceCounter::new(sequence),
                status,
                dodag_id: None,
            }),
        );
    }

    // === DCO ===

    fn process_dco(&mut self, src_addr: Ipv6Address, dco: &Dco) {
        self.stats.dco_recvd += 1;

        if !self.with_dco || !self.instance.is_storing() {
            return;
        }

        if dco.rpl_instance_id != self.instance.id {
            net_trace!("ignoring DCO for unknown instance {:?}", dco.rpl_instance_id);
            return;
        }

        if let (Some(dodag), Some(dodag_id)) = (self.instance.dodag.as_ref(), dco.dodag_id) {
            if dodag_id != dodag.id {
                net_trace!("ignoring DCO for a DAG different from ours");
                return;
            }
        }

        let mut target = None;
        let mut transit = None;

        for opt in &dco.options {
            match opt {
                OptionRepr::Pad1 | OptionRepr::PadN(_) => (),
                OptionRepr::RplTarget(t) => {
                    target = Some((prefix_address(&t.prefix), t.prefix_length));
                }
                OptionRepr::TransitInformation(t) => {
                    transit = Some((t.path_sequence, t.path_lifetime));
                }
                _ => net_trace!("received invalid option in DCO"),
            }
        }

        // A DCO without target and transit options carries no cleanup
        // instruction at all.
        let (Some((prefix, prefix_len)), Some((path_sequence, path_lifetime))) = (target, transit)
        else {
            self.stats.malformed_msgs += 1;
            return;
        };

        let sequence = dco.sequence.value();

        let route = self
            .routes
            .lookup(&prefix, prefix_len)
            .map(|route| (route.next_hop, route.dao_path_sequence));

        match route {
            Some((next_hop, stored)) if path_lifetime == ZERO_LIFETIME => {
                if SequenceCounter::new(path_sequence)
                    .greater_than(&SequenceCounter::new(stored))
                {
                    // The cleanup is newer than our registration: pass it
                    // down the stale path, then drop the route.
                    net_trace!("forwarding DCO to {}", next_hop);
                    let fwd = self.build_dco(
                        prefix,
                        prefix_len,
                        path_sequence,
                        dco.sequence,
                        dco.expect_ack,
                    );
                    self.stats.dco_forwarded += 1;
                    self.transmit(next_hop, fwd);
                    self.routes.remove(&prefix, prefix_len);
                } else {
                    net_trace!(
                        "DCO path sequence {} not newer than {}, ignoring",
                        path_sequence,
                        stored
                    );
                    self.stats.dco_ignored += 1;
                }

                if dco.expect_ack {
                    self.dco_ack_output(src_addr, sequence, DAO_ACK_UNCONDITIONAL_ACCEPT);
                }
            }
            _ => {
                if self.global_address == Some(prefix) {
                    // A cleanup for our own address needs no answer.
                    net_trace!("received DCO for our own address");
                    self.stats.dco_ignored += 1;
                    return;
                }

                net_trace!("no route entry found for DCO target");
                if dco.expect_ack {
                    // The negative acknowledgement stops retransmissions at
                    // the sender.
                    self.dco_ack_output(src_addr, sequence, DCO_ACK_NO_ROUTE);
                }
            }
        }
    }

    /// Queue a DCO that invalidates the path to `target` through
    /// `next_hop`.
    pub fn dco_output(&mut self, target: Ipv6Address, next_hop: Ipv6Address, path_sequence: u8) {
        if !self.with_dco {
            return;
        }

        let sequence = self.instance.dco_sequence;
        self.instance.dco_sequence.increment();

        let dco = self.build_dco(target, 128, path_sequence, sequence, self.with_dco_ack);

        net_trace!("sending DCO for {} to {}", target, next_hop);
        self.stats.dco_sent += 1;
        self.transmit(next_hop, dco);
    }

    fn build_dco(
        &self,
        prefix: Ipv6Address,
        prefix_len: u8,
        path_sequence: u8,
        sequence: SequenceCounter,
        expect_ack: bool,
    ) -> RplRepr {
        let mut options = heapless::Vec::new();

        let _ = options.push(OptionRepr::RplTarget(options::RplTarget {
            prefix_length: prefix_len,
            prefix: heapless::Vec::from_slice(
                &prefix.as_bytes()[..(prefix_len as usize + 7) / 8],
            )
            .unwrap(),
        }));

        let _ = options.push(OptionRepr::TransitInformation(
            options::TransitInformation {
                external: false,
                path_control: 0,
                path_sequence,
                path_lifetime: ZERO_LIFETIME,
                parent_address: None,
            },
        ));

        RplRepr::DestinationCleanupObject(Dco {
            rpl_instance_id: self.instance.id,
            expect_ack,
            sequence,
            dodag_id: None,
            options,
        })
    }

    fn process_dco_ack(&mut self, src_addr: Ipv6Address, ack: &DcoAck) {
        self.stats.dco_ack_recvd += 1;

        // Nothing awaits the acknowledgement: DCOs are not retransmitted.
        net_trace!(
            "received a DCO-ACK with sequence {} and status {} from {}",
            ack.sequence,
            ack.status,
            src_addr
        );
    }

    fn dco_ack_output(&mut self, dst_addr: Ipv6Address, sequence: u8, status: u8) {
        net_trace!(
            "sending a DCO {} with sequence {} to {}",
            if status < 128 { "ACK" } else { "NACK" },
            sequence,
            dst_addr
        );

        self.transmit(
            dst_addr,
            RplRepr::DestinationCleanupObjectAck(DcoAck {
                rpl_instance_id: self.instance.id,
                sequence: SequenceCounter::new(sequence),
                status,
                dodag_id: None,
            }),
        );
    }

    // === Timers and repair ===

    /// Let the wall clock advance: fire the trickle timer, solicit while
    /// unjoined, retransmit unacknowledged DAOs and age out the tables.
    pub fn poll(&mut self, now: Instant) {
        if !self.has_parent() && !self.is_root && now >= self.dis_expiration {
            self.dis_expiration = now + Duration::from_secs(DIS_INTERVAL as u64);
            self.dis_output(None);
        }

        let transmit_dio = match self.instance.dodag.as_mut() {
            Some(dodag) => dodag.dio_timer.poll(now, &mut self.rand),
            None => false,
        };
        if transmit_dio {
            self.dio_output(None);
        }

        if let Some(at) = self.instance.dao_expiration {
            if now >= at {
                self.instance.dao_expiration = None;
                self.dao_output(now, self.instance.dodag_conf.default_lifetime);
            }
        }

        if let Some(at) = self.instance.dao_retransmit_at {
            if now >= at {
                self.dao_retransmit(now);
            }
        }

        self.routes.tick(now);
        self.relations.purge(now);

        let purged = match self.instance.dodag.as_mut() {
            Some(dodag) => {
                let expiration = dodag.dio_timer.max_expiration() * 2;
                let purged = dodag.parents.purge(now, expiration);
                if purged {
                    self.neighbors.purge(now, expiration);
                }
                purged
            }
            None => false,
        };

        if purged {
            self.update_preferred_parent(now);

            if !self.has_parent() && !self.is_root {
                // Lost every parent; start soliciting again.
                self.dis_expiration = self
                    .dis_expiration
                    .min(now + Duration::from_secs(DIS_START_DELAY as u64));
            }
        }
    }

    /// The next instant at which [`Rpl::poll`] should be called, or
    /// [`Rpl::poll_transmit`] has something to hand out.
    pub fn poll_at(&self) -> Instant {
        if !self.queue.is_empty() {
            return Instant::ZERO;
        }

        let mut poll_at = Instant::from_micros(i64::MAX);

        if !self.has_parent() && !self.is_root {
            poll_at = poll_at.min(self.dis_expiration);
        }

        if let Some(dodag) = &self.instance.dodag {
            poll_at = poll_at.min(dodag.dio_timer.poll_at());
        }

        if let Some(at) = self.instance.dao_expiration {
            poll_at = poll_at.min(at);
        }

        if let Some(at) = self.instance.dao_retransmit_at {
            poll_at = poll_at.min(at);
        }

        poll_at
    }

    /// Run the timers, then hand out the next message to transmit, if any.
    pub fn poll_transmit(&mut self, now: Instant) -> Option<Transmit> {
        self.poll(now);
        self.queue.pop_front()
    }

    fn dao_retransmit(&mut self, now: Instant) {
        if self.instance.my_dao_transmissions >= DAO_MAX_RETRANSMISSIONS {
            // No more retransmissions; give up.
            self.instance.dao_retransmit_at = None;

            if self.instance.uses_legacy_lifetimes() {
                // An infinite-lifetime configuration predates DAO-ACK
                // support: the root probably never answers. Let the normal
                // repair mechanisms detect any problem.
                return;
            }

            if self.instance.is_storing() {
                let preferred = self.preferred_parent_address();
                let Instance { of, dodag, .. } = &mut self.instance;
                if let Some(parent) = preferred
                    .and_then(|addr| dodag.as_mut().and_then(|d| d.parents.find_mut(&addr)))
                {
                    of.dao_ack_callback(parent, DAO_ACK_TIMEOUT);
                }
            }

            // Perform a local repair and hope to find another parent.
            self.local_repair(now);
            return;
        }

        let Some(prefix) = self.global_address else {
            self.instance.dao_retransmit_at = None;
            return;
        };

        net_debug!(
            "retransmitting DAO, sequence {} attempt {}",
            self.instance.my_dao_seqno,
            self.instance.my_dao_transmissions
        );

        let timeout = DAO_RETRANSMISSION_TIMEOUT_MILLIS;
        let jitter = self.rand.rand_u16() as u64 % (timeout / 2);
        self.instance.dao_retransmit_at = Some(now + Duration::from_millis(timeout / 2 + jitter));
        self.instance.my_dao_transmissions += 1;

        let lifetime = self.instance.dodag_conf.default_lifetime;
        let sequence = self.instance.my_dao_seqno;
        self.dao_output_target_seq(prefix, lifetime, sequence);
    }

    /// Detach from the DODAG and re-enter parent discovery, keeping the
    /// instance. Invoked when persistent DAO failure shows we are isolated
    /// from the DODAG.
    pub fn local_repair(&mut self, now: Instant) {
        if self.is_root {
            return;
        }

        net_debug!("local repair");

        self.instance.of.reset();

        if let Some(dodag) = self.instance.dodag.as_mut() {
            dodag.parents.clear();
            dodag.detach();
            dodag.dio_timer.restart(now, &mut self.rand);
        }

        self.instance.has_downward_route = false;
        self.instance.dao_retransmit_at = None;
        self.instance.dao_expiration = None;
        self.instance.my_dao_transmissions = 0;
        self.routes.clear();

        self.dis_expiration = now + Duration::from_secs(DIS_START_DELAY as u64);
    }

    // === Link statistics ===

    /// Report the outcome of a link-layer transmission toward a neighbor,
    /// feeding the ETX estimate of the link. The preferred parent election
    /// follows the updated metric.
    pub fn link_stats_packet_sent(
        &mut self,
        now: Instant,
        neighbor: Ipv6Address,
        status: TransmissionStatus,
        numtx: u8,
    ) {
        let known = {
            let Instance { of, dodag, .. } = &mut self.instance;

            match dodag
                .as_mut()
                .and_then(|dodag| dodag.parents.find_mut(&neighbor))
            {
                Some(parent) => {
                    of.neighbor_link_callback(parent, status, numtx);
                    true
                }
                None => false,
            }
        };

        if known {
            self.update_preferred_parent(now);
        }
    }

    fn preferred_parent_address(&self) -> Option<Ipv6Address> {
        self.instance
            .dodag
            .as_ref()
            .and_then(|dodag| dodag.preferred_parent)
    }

    fn unable_to_accept_status(&self) -> u8 {
        if self.is_root {
            DAO_ACK_UNABLE_TO_ADD_ROUTE_AT_ROOT
        } else {
            DAO_ACK_UNABLE_TO_ACCEPT
        }
    }
}

/// Assign a fresh outgoing sequence number to a route whose DAO is about to
/// be forwarded upward, and remember the incoming one for the
/// acknowledgement coming back down.
fn prepare_for_dao_fwd(
    instance: &mut Instance,
    route: &mut crate::routes::Route,
    sequence: u8,
) -> u8 {
    instance.dao_sequence.increment();

    route.dao_seqno_in = sequence;
    route.dao_seqno_out = instance.dao_sequence.value();
    route.flags |= RouteFlags::DAO_PENDING;

    instance.dao_sequence.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::DodagConfiguration;
    use crate::wire::{ModeOfOperation, RplInstanceId};
    use crate::{Config, RootConfig, Rpl};

    use rstest::rstest;
    use std::vec::Vec;

    fn dodag_id() -> Ipv6Address {
        Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 1)
    }

    fn ll_addr(last: u8) -> Ipv6Address {
        Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, last as u16)
    }

    fn global_addr(last: u8) -> Ipv6Address {
        Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 1, last as u16)
    }

    fn drain(rpl: &mut Rpl, now: Instant) -> Vec<Transmit> {
        let mut transmits = Vec::new();
        while let Some(transmit) = rpl.poll_transmit(now) {
            transmits.push(transmit);
        }
        transmits
    }

    fn dio(rank: u16, mop: ModeOfOperation) -> RplRepr {
        dio_with(rank, mop, Default::default(), Default::default())
    }

    fn dio_with(
        rank: u16,
        mop: ModeOfOperation,
        version_number: SequenceCounter,
        dtsn: SequenceCounter,
    ) -> RplRepr {
        let mut options = heapless::Vec::new();
        options.push(DodagConfiguration::default().to_option()).unwrap();

        RplRepr::DodagInformationObject(Dio {
            rpl_instance_id: RplInstanceId::from(30),
            version_number,
            rank,
            grounded: false,
            mode_of_operation: mop,
            dodag_preference: 0,
            dtsn,
            dodag_id: dodag_id(),
            options,
        })
    }

    fn dao(
        src_target: Ipv6Address,
        sequence: u8,
        lifetime: u8,
        path_sequence: u8,
        expect_ack: bool,
    ) -> RplRepr {
        let mut options = heapless::Vec::new();
        options
            .push(OptionRepr::RplTarget(options::RplTarget {
                prefix_length: 128,
                prefix: heapless::Vec::from_slice(src_target.as_bytes()).unwrap(),
            }))
            .unwrap();
        options
            .push(OptionRepr::TransitInformation(options::TransitInformation {
                external: false,
                path_control: 0,
                path_sequence,
                path_lifetime: lifetime,
                parent_address: None,
            }))
            .unwrap();

        RplRepr::DestinationAdvertisementObject(Dao {
            rpl_instance_id: RplInstanceId::from(30),
            expect_ack,
            sequence: SequenceCounter::new(sequence),
            dodag_id: None,
            options,
        })
    }

    fn dco(target: Ipv6Address, sequence: u8, path_sequence: u8, expect_ack: bool) -> RplRepr {
        let mut options = heapless::Vec::new();
        options
            .push(OptionRepr::RplTarget(options::RplTarget {
                prefix_length: 128,
                prefix: heapless::Vec::from_slice(target.as_bytes()).unwrap(),
            }))
            .unwrap();
        options
            .push(OptionRepr::TransitInformation(options::TransitInformation {
                external: false,
                path_control: 0,
                path_sequence,
                path_lifetime: 0,
                parent_address: None,
            }))
            .unwrap();

        RplRepr::DestinationCleanupObject(Dco {
            rpl_instance_id: RplInstanceId::from(30),
            expect_ack,
            sequence: SequenceCounter::new(sequence),
            dodag_id: None,
            options,
        })
    }

    fn root_node(mop: ModeOfOperation) -> Rpl {
        let mut rpl = Rpl::new(
            Config::new(RplInstanceId::from(30))
                .with_mode_of_operation(mop)
                .into_root(RootConfig::new(dodag_id())),
            Instant::ZERO,
        );
        rpl.set_global_address(dodag_id());
        rpl
    }

    /// A node that joined the DODAG through the parent `ll_addr(1)`.
    fn joined_node(mop: ModeOfOperation) -> (Rpl, Ipv6Address) {
        let mut rpl = Rpl::new(
            Config::new(RplInstanceId::from(30)).with_mode_of_operation(mop),
            Instant::ZERO,
        );
        rpl.set_global_address(global_addr(1));

        let parent = ll_addr(1);
        rpl.process(
            Instant::ZERO,
            parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, mop),
        );

        assert!(rpl.has_parent());
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());

        // The registration the join scheduled is driven explicitly where a
        // test needs it.
        rpl.instance.dao_expiration = None;

        (rpl, parent)
    }

    #[test]
    fn join_dodag_on_dio() {
        let mut rpl = Rpl::new(Config::new(RplInstanceId::from(30)), Instant::ZERO);
        rpl.set_global_address(global_addr(1));

        let parent = ll_addr(1);
        rpl.process(
            Instant::ZERO,
            parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::StoringModeWithoutMulticast),
        );

        let dodag = rpl.instance.dodag().unwrap();
        assert_eq!(dodag.id(), dodag_id());
        assert_eq!(dodag.preferred_parent().unwrap().address(), parent);

        // OF0 with the ETX based step of rank: the initial link metric of
        // 2.0 maps to a step of 4, giving a rank of 256 + 4 * 256.
        assert_eq!(dodag.rank().raw_value(), 256 + 4 * 256);

        // Joining scheduled the registration of our own target.
        assert!(rpl.instance.dao_expiration.is_some());
    }

    #[test]
    fn ignore_dio_for_unknown_instance() {
        let mut rpl = Rpl::new(Config::new(RplInstanceId::from(42)), Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            ll_addr(1),
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::StoringModeWithoutMulticast),
        );

        assert!(rpl.instance.dodag().is_none());
    }

    #[test]
    fn ignore_dio_with_other_mode_of_operation() {
        let mut rpl = Rpl::new(
            Config::new(RplInstanceId::from(30))
                .with_mode_of_operation(ModeOfOperation::StoringModeWithoutMulticast),
            Instant::ZERO,
        );

        rpl.process(
            Instant::ZERO,
            ll_addr(1),
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::NonStoringMode),
        );

        assert!(rpl.instance.dodag().is_none());
    }

    #[rstest]
    #[case::mop0(ModeOfOperation::NoDownwardRoutesMaintained)]
    #[case::mop1(ModeOfOperation::NonStoringMode)]
    #[case::mop2(ModeOfOperation::StoringModeWithoutMulticast)]
    fn unicast_dis(#[case] mop: ModeOfOperation) {
        let mut rpl = root_node(mop);

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            ll_addr(99),
            &RplRepr::DodagInformationSolicitation(Dis {
                options: Default::default(),
            }),
        );

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);
        assert_eq!(transmits[0].dst_addr, ll_addr(2));

        match &transmits[0].msg {
            RplRepr::DodagInformationObject(dio) => {
                assert_eq!(dio.rank, Rank::ROOT.raw_value());
                assert_eq!(dio.dodag_id, dodag_id());
                assert!(dio
                    .options
                    .iter()
                    .any(|opt| matches!(opt, OptionRepr::DodagConfiguration(_))));
            }
            msg => panic!("expected DIO, got {msg}"),
        }
    }

    #[test]
    fn multicast_dis_resets_trickle_timer() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        // Let the trickle interval grow past its minimum.
        for secs in 0..100 {
            drain(&mut rpl, Instant::from_secs(secs));
        }

        let timer = &rpl.instance.dodag().unwrap().dio_timer;
        assert!(timer.get_i() > timer.min_expiration());

        rpl.process(
            Instant::from_secs(100),
            ll_addr(9),
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &RplRepr::DodagInformationSolicitation(Dis {
                options: Default::default(),
            }),
        );

        let timer = &rpl.instance.dodag().unwrap().dio_timer;
        assert_eq!(timer.get_i(), timer.min_expiration());
    }

    #[test]
    fn leaf_ignores_multicast_dis_and_advertises_infinite_rank() {
        let mut rpl = Rpl::new(
            Config::new(RplInstanceId::from(30))
                .with_mode_of_operation(ModeOfOperation::StoringModeWithoutMulticast)
                .with_leaf_only(true),
            Instant::ZERO,
        );
        rpl.process(
            Instant::ZERO,
            ll_addr(1),
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::StoringModeWithoutMulticast),
        );
        drain(&mut rpl, Instant::ZERO);

        for secs in 0..100 {
            drain(&mut rpl, Instant::from_secs(secs));
        }

        let timer = &rpl.instance.dodag().unwrap().dio_timer;
        let interval = timer.get_i();
        assert!(interval > timer.min_expiration());

        // A multicast DIS does not reset the timer of a leaf.
        rpl.process(
            Instant::from_secs(100),
            ll_addr(9),
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &RplRepr::DodagInformationSolicitation(Dis {
                options: Default::default(),
            }),
        );
        assert_eq!(rpl.instance.dodag().unwrap().dio_timer.get_i(), interval);

        // Multicast DIOs are suppressed entirely.
        rpl.dio_output(None);
        assert!(drain(&mut rpl, Instant::from_secs(100)).is_empty());

        // A unicast reply advertises the infinite rank.
        rpl.dio_output(Some(ll_addr(9)));
        let transmits = drain(&mut rpl, Instant::from_secs(100));
        match &transmits[0].msg {
            RplRepr::DodagInformationObject(dio) => {
                assert_eq!(dio.rank, Rank::INFINITE.raw_value());
            }
            msg => panic!("expected DIO, got {msg}"),
        }
    }

    #[test]
    fn solicited_information_mismatch_stays_quiet() {
        let mut rpl = root_node(ModeOfOperation::StoringModeWithoutMulticast);

        let mut options = heapless::Vec::new();
        options
            .push(OptionRepr::SolicitedInformation(
                options::SolicitedInformation {
                    rpl_instance_id: RplInstanceId::from(42),
                    version_predicate: false,
                    instance_id_predicate: true,
                    dodag_id_predicate: false,
                    dodag_id: Default::default(),
                    version_number: Default::default(),
                },
            ))
            .unwrap();

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            ll_addr(99),
            &RplRepr::DodagInformationSolicitation(Dis { options }),
        );

        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
    }

    #[test]
    fn preferred_parent_infinite_rank_detaches() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.process(
            Instant::ZERO,
            parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(
                Rank::INFINITE.raw_value(),
                ModeOfOperation::StoringModeWithoutMulticast,
            ),
        );

        assert!(!rpl.has_parent());
        assert!(rpl.instance.dodag().unwrap().rank().is_infinite());

        // The node poisons its own sub-DODAG.
        let transmits = drain(&mut rpl, Instant::ZERO);
        assert!(transmits.iter().any(|t| matches!(
            &t.msg,
            RplRepr::DodagInformationObject(dio) if dio.rank == Rank::INFINITE.raw_value()
        )));
    }

    #[test]
    fn dtsn_increment_schedules_dao_refresh() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        let mut dtsn = SequenceCounter::default();
        dtsn.increment();

        rpl.process(
            Instant::ZERO,
            parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio_with(
                256,
                ModeOfOperation::StoringModeWithoutMulticast,
                Default::default(),
                dtsn,
            ),
        );

        assert!(rpl.instance.dao_expiration.is_some());

        let transmits: Vec<_> = (0..10)
            .flat_map(|secs| drain(&mut rpl, Instant::from_secs(secs)))
            .collect();

        assert!(transmits.iter().any(|t| matches!(
            &t.msg,
            RplRepr::DestinationAdvertisementObject(dao) if dao.expect_ack
        )));
    }

    #[test]
    fn loop_detected_when_preferred_parent_sends_dao() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.process(
            Instant::ZERO,
            parent,
            global_addr(1),
            &dao(global_addr(2), 100, 30, 7, true),
        );

        let dodag = rpl.instance.dodag().unwrap();
        let poisoned = dodag.parents.find(&parent).unwrap();
        assert!(poisoned.rank().is_infinite());
        assert!(poisoned
            .flags
            .contains(crate::parents::ParentFlags::UPDATED));

        // The offending DAO is not forwarded, and no route was installed.
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
        assert!(rpl.routes().is_empty());
    }

    #[test]
    fn dao_installs_route_and_forwards_with_fresh_sequence() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );

        let route = rpl.routes().lookup(&global_addr(5), 128).unwrap();
        assert_eq!(route.next_hop(), child);
        assert_eq!(route.lifetime(), 30 * 60);
        assert_eq!(route.dao_path_sequence, 7);
        assert!(route.is_dao_pending());
        assert_eq!(route.dao_seqno_in, 100);

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);
        assert_eq!(transmits[0].dst_addr, parent);

        match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObject(fwd) => {
                // The forwarded copy carries a fresh sequence number.
                assert_ne!(fwd.sequence.value(), 100);
                assert!(fwd.expect_ack);
            }
            msg => panic!("expected DAO, got {msg}"),
        }
    }

    #[test]
    fn dao_retransmission_from_below_is_idempotent() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );
        let first = drain(&mut rpl, Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );
        let second = drain(&mut rpl, Instant::ZERO);

        // No second route entry, and the forwarded copy reuses the same
        // outgoing sequence number.
        assert_eq!(rpl.routes().iter().count(), 1);

        let sequence_of = |transmits: &[Transmit]| match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObject(dao) => dao.sequence.value(),
            msg => panic!("expected DAO, got {msg}"),
        };

        assert_eq!(sequence_of(&first), sequence_of(&second));
    }

    #[test]
    fn root_acknowledges_immediately() {
        let mut rpl = root_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(2);

        rpl.process(
            Instant::ZERO,
            child,
            dodag_id(),
            &dao(global_addr(2), 100, 30, 7, true),
        );

        assert!(rpl.routes().lookup(&global_addr(2), 128).is_some());

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);
        assert_eq!(transmits[0].dst_addr, child);

        match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObjectAck(ack) => {
                assert_eq!(ack.sequence.value(), 100);
                assert_eq!(ack.status, DAO_ACK_UNCONDITIONAL_ACCEPT);
            }
            msg => panic!("expected DAO-ACK, got {msg}"),
        }
    }

    #[test]
    fn no_path_dao_lingers_and_is_forwarded() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );
        drain(&mut rpl, Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 101, ZERO_LIFETIME, 8, true),
        );

        let route = rpl.routes().lookup(&global_addr(5), 128).unwrap();
        assert!(route.is_nopath_received());
        assert_eq!(route.lifetime(), NOPATH_REMOVAL_DELAY);

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 2);

        // The withdrawal travels upward with a fresh sequence number.
        assert_eq!(transmits[0].dst_addr, parent);
        match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObject(fwd) => {
                assert_ne!(fwd.sequence.value(), 101);
                let lifetime = fwd.options.iter().find_map(|opt| match opt {
                    OptionRepr::TransitInformation(t) => Some(t.path_lifetime),
                    _ => None,
                });
                assert_eq!(lifetime, Some(ZERO_LIFETIME));
            }
            msg => panic!("expected DAO, got {msg}"),
        }

        // The sender is acknowledged.
        assert_eq!(transmits[1].dst_addr, child);
        match &transmits[1].msg {
            RplRepr::DestinationAdvertisementObjectAck(ack) => {
                assert_eq!(ack.sequence.value(), 101);
                assert_eq!(ack.status, DAO_ACK_UNCONDITIONAL_ACCEPT);
            }
            msg => panic!("expected DAO-ACK, got {msg}"),
        }
    }

    #[test]
    fn next_hop_change_triggers_dco() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let old_next_hop = ll_addr(5);
        let new_next_hop = ll_addr(6);

        rpl.process(
            Instant::ZERO,
            old_next_hop,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, false),
        );
        drain(&mut rpl, Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            new_next_hop,
            global_addr(1),
            &dao(global_addr(5), 50, 30, 8, false),
        );

        assert_eq!(
            rpl.routes().lookup(&global_addr(5), 128).unwrap().next_hop(),
            new_next_hop
        );

        let transmits = drain(&mut rpl, Instant::ZERO);
        let dco = transmits
            .iter()
            .find(|t| matches!(&t.msg, RplRepr::DestinationCleanupObject(_)))
            .expect("expected a DCO toward the old next hop");

        assert_eq!(dco.dst_addr, old_next_hop);
        match &dco.msg {
            RplRepr::DestinationCleanupObject(dco) => {
                let (target, path_sequence) =
                    dco.options
                        .iter()
                        .fold((None, None), |acc, opt| match opt {
                            OptionRepr::RplTarget(t) => {
                                (Some(prefix_address(&t.prefix)), acc.1)
                            }
                            OptionRepr::TransitInformation(t) => {
                                (acc.0, Some(t.path_sequence))
                            }
                            _ => acc,
                        });

                assert_eq!(target, Some(global_addr(5)));
                // The cleanup carries the path sequence of the new
                // registration.
                assert_eq!(path_sequence, Some(8));
            }
            msg => panic!("expected DCO, got {msg}"),
        }
    }

    #[test]
    fn dao_ack_stops_retransmission() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.dao_output(Instant::ZERO, 30);
        drain(&mut rpl, Instant::ZERO);

        assert!(rpl.instance.dao_retransmit_at.is_some());
        let sequence = rpl.instance.my_dao_seqno;

        rpl.process(
            Instant::ZERO,
            parent,
            global_addr(1),
            &RplRepr::DestinationAdvertisementObjectAck(DaoAck {
                rpl_instance_id: RplInstanceId::from(30),
                sequence: SequenceCounter::new(sequence),
                status: DAO_ACK_UNCONDITIONAL_ACCEPT,
                dodag_id: None,
            }),
        );

        assert!(rpl.instance.dao_retransmit_at.is_none());
        assert!(rpl.instance.has_downward_route());
    }

    #[test]
    fn dao_nack_triggers_local_repair_when_configured() {
        let mut rpl = Rpl::new(
            Config::new(RplInstanceId::from(30))
                .with_mode_of_operation(ModeOfOperation::StoringModeWithoutMulticast)
                .with_repair_on_dao_nack(true),
            Instant::ZERO,
        );
        rpl.set_global_address(global_addr(1));
        let parent = ll_addr(1);
        rpl.process(
            Instant::ZERO,
            parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::StoringModeWithoutMulticast),
        );
        drain(&mut rpl, Instant::ZERO);
        rpl.instance.dao_expiration = None;

        rpl.dao_output(Instant::ZERO, 30);
        drain(&mut rpl, Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            parent,
            global_addr(1),
            &RplRepr::DestinationAdvertisementObjectAck(DaoAck {
                rpl_instance_id: RplInstanceId::from(30),
                sequence: SequenceCounter::new(rpl.instance.my_dao_seqno),
                status: DAO_ACK_UNABLE_TO_ACCEPT,
                dodag_id: None,
            }),
        );

        assert!(!rpl.has_parent());
        assert!(rpl.instance.dodag().unwrap().rank().is_infinite());
        assert!(!rpl.instance.has_downward_route());
    }

    #[test]
    fn dao_ack_for_forwarded_dao_travels_down() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );
        let transmits = drain(&mut rpl, Instant::ZERO);
        let out_sequence = match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObject(fwd) => fwd.sequence.value(),
            msg => panic!("expected DAO, got {msg}"),
        };

        rpl.process(
            Instant::ZERO,
            parent,
            global_addr(1),
            &RplRepr::DestinationAdvertisementObjectAck(DaoAck {
                rpl_instance_id: RplInstanceId::from(30),
                sequence: SequenceCounter::new(out_sequence),
                status: DAO_ACK_UNCONDITIONAL_ACCEPT,
                dodag_id: None,
            }),
        );

        // The acknowledgement is rewritten to the sequence number the
        // child used, and the pending flag is cleared.
        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);
        assert_eq!(transmits[0].dst_addr, child);
        match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObjectAck(ack) => {
                assert_eq!(ack.sequence.value(), 100);
                assert_eq!(ack.status, DAO_ACK_UNCONDITIONAL_ACCEPT);
            }
            msg => panic!("expected DAO-ACK, got {msg}"),
        }

        let route = rpl.routes().lookup(&global_addr(5), 128).unwrap();
        assert!(!route.is_dao_pending());
    }

    #[test]
    fn dao_nack_for_forwarded_dao_removes_route() {
        let (mut rpl, parent) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, true),
        );
        let transmits = drain(&mut rpl, Instant::ZERO);
        let out_sequence = match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObject(fwd) => fwd.sequence.value(),
            msg => panic!("expected DAO, got {msg}"),
        };

        rpl.process(
            Instant::ZERO,
            parent,
            global_addr(1),
            &RplRepr::DestinationAdvertisementObjectAck(DaoAck {
                rpl_instance_id: RplInstanceId::from(30),
                sequence: SequenceCounter::new(out_sequence),
                status: DAO_ACK_UNABLE_TO_ACCEPT,
                dodag_id: None,
            }),
        );

        // The negative acknowledgement travels down unchanged, and the
        // route that never made it upstream is removed.
        let transmits = drain(&mut rpl, Instant::ZERO);
        match &transmits[0].msg {
            RplRepr::DestinationAdvertisementObjectAck(ack) => {
                assert_eq!(ack.status, DAO_ACK_UNABLE_TO_ACCEPT);
            }
            msg => panic!("expected DAO-ACK, got {msg}"),
        }

        assert!(rpl.routes().lookup(&global_addr(5), 128).is_none());
    }

    #[test]
    fn dao_retransmission_backoff_and_local_repair() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.dao_output(Instant::ZERO, 30);
        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);

        let sequence = rpl.instance.my_dao_seqno;
        let mut sent = 1;
        let mut now = Instant::ZERO;

        while let Some(deadline) = rpl.instance.dao_retransmit_at {
            now = deadline;
            let transmits = drain(&mut rpl, now);

            for transmit in &transmits {
                if let RplRepr::DestinationAdvertisementObject(dao) = &transmit.msg {
                    // Every retransmission reuses the same sequence number.
                    assert_eq!(dao.sequence.value(), sequence);
                    sent += 1;
                }
            }

            if let Some(next) = rpl.instance.dao_retransmit_at {
                // Randomized backoff: the next deadline lies in
                // [T/2, T) after the previous one.
                let delta = (next - now).total_millis();
                assert!(delta >= DAO_RETRANSMISSION_TIMEOUT_MILLIS / 2);
                assert!(delta < DAO_RETRANSMISSION_TIMEOUT_MILLIS);
            }
        }

        assert_eq!(sent, DAO_MAX_RETRANSMISSIONS);

        // The retransmissions are exhausted: the node detached.
        assert!(!rpl.has_parent());
        assert!(rpl.instance.dodag().unwrap().rank().is_infinite());
    }

    #[test]
    fn stale_dco_is_ignored() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, false),
        );
        drain(&mut rpl, Instant::ZERO);

        // A cleanup with a path sequence that is not newer than the stored
        // one is counted and dropped, but still acknowledged.
        rpl.process(
            Instant::ZERO,
            ll_addr(7),
            global_addr(1),
            &dco(global_addr(5), 240, 6, true),
        );

        assert_eq!(rpl.stats().dco_ignored, 1);
        assert!(rpl.routes().lookup(&global_addr(5), 128).is_some());

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert!(matches!(
            &transmits[0].msg,
            RplRepr::DestinationCleanupObjectAck(ack) if ack.status == 0
        ));
    }

    #[test]
    fn dco_forwards_and_removes_route() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);
        let child = ll_addr(5);

        rpl.process(
            Instant::ZERO,
            child,
            global_addr(1),
            &dao(global_addr(5), 100, 30, 7, false),
        );
        drain(&mut rpl, Instant::ZERO);

        rpl.process(
            Instant::ZERO,
            ll_addr(7),
            global_addr(1),
            &dco(global_addr(5), 240, 8, true),
        );

        assert!(rpl.routes().lookup(&global_addr(5), 128).is_none());

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 2);

        // The cleanup continues along the stale path toward the target.
        assert_eq!(transmits[0].dst_addr, child);
        assert!(matches!(
            &transmits[0].msg,
            RplRepr::DestinationCleanupObject(_)
        ));

        assert!(matches!(
            &transmits[1].msg,
            RplRepr::DestinationCleanupObjectAck(ack) if ack.status == 0
        ));
    }

    #[test]
    fn dco_for_unknown_target_is_nacked() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.process(
            Instant::ZERO,
            ll_addr(7),
            global_addr(1),
            &dco(global_addr(9), 240, 8, true),
        );

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert_eq!(transmits.len(), 1);
        assert!(matches!(
            &transmits[0].msg,
            RplRepr::DestinationCleanupObjectAck(ack) if ack.status == DCO_ACK_NO_ROUTE
        ));

        // A cleanup for our own address is accepted silently.
        rpl.process(
            Instant::ZERO,
            ll_addr(7),
            global_addr(1),
            &dco(global_addr(1), 241, 8, true),
        );
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
        assert_eq!(rpl.stats().dco_ignored, 1);
    }

    #[test]
    fn dco_without_transit_is_malformed() {
        let (mut rpl, _) = joined_node(ModeOfOperation::StoringModeWithoutMulticast);

        let mut options = heapless::Vec::new();
        options
            .push(OptionRepr::RplTarget(options::RplTarget {
                prefix_length: 128,
                prefix: heapless::Vec::from_slice(global_addr(5).as_bytes()).unwrap(),
            }))
            .unwrap();

        rpl.process(
            Instant::ZERO,
            ll_addr(7),
            global_addr(1),
            &RplRepr::DestinationCleanupObject(Dco {
                rpl_instance_id: RplInstanceId::from(30),
                expect_ack: true,
                sequence: SequenceCounter::new(240),
                dodag_id: None,
                options,
            }),
        );

        assert_eq!(rpl.stats().malformed_msgs, 1);
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
    }

    #[test]
    fn non_storing_dao_maintains_relations() {
        let mut rpl = root_node(ModeOfOperation::NonStoringMode);
        let child = global_addr(2);
        let via = global_addr(3);

        let mut options = heapless::Vec::new();
        options
            .push(OptionRepr::RplTarget(options::RplTarget {
                prefix_length: 128,
                prefix: heapless::Vec::from_slice(child.as_bytes()).unwrap(),
            }))
            .unwrap();
        options
            .push(OptionRepr::TransitInformation(options::TransitInformation {
                external: false,
                path_control: 0,
                path_sequence: 7,
                path_lifetime: 30,
                parent_address: Some(via),
            }))
            .unwrap();

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            dodag_id(),
            &RplRepr::DestinationAdvertisementObject(Dao {
                rpl_instance_id: RplInstanceId::from(30),
                expect_ack: true,
                sequence: SequenceCounter::new(100),
                dodag_id: None,
                options: options.clone(),
            }),
        );

        assert_eq!(rpl.relations().find_parent(&child), Some(via));

        let transmits = drain(&mut rpl, Instant::ZERO);
        assert!(matches!(
            &transmits[0].msg,
            RplRepr::DestinationAdvertisementObjectAck(ack)
                if ack.sequence.value() == 100 && ack.status == DAO_ACK_UNCONDITIONAL_ACCEPT
        ));

        // A No-Path DAO expires the link again.
        for opt in options.iter_mut() {
            if let OptionRepr::TransitInformation(t) = opt {
                t.path_lifetime = ZERO_LIFETIME;
            }
        }

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            dodag_id(),
            &RplRepr::DestinationAdvertisementObject(Dao {
                rpl_instance_id: RplInstanceId::from(30),
                expect_ack: true,
                sequence: SequenceCounter::new(101),
                dodag_id: None,
                options,
            }),
        );

        assert_eq!(rpl.relations().find_parent(&child), None);
    }

    #[test]
    fn non_storing_dao_without_parent_address_is_malformed() {
        let mut rpl = root_node(ModeOfOperation::NonStoringMode);

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            dodag_id(),
            &dao(global_addr(2), 100, 30, 7, true),
        );

        assert_eq!(rpl.stats().malformed_msgs, 1);
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
    }

    #[test]
    fn unjoined_node_solicits_with_dis() {
        let mut rpl = Rpl::new(Config::new(RplInstanceId::from(30)), Instant::ZERO);

        assert!(drain(&mut rpl, Instant::ZERO).is_empty());

        let transmits = drain(&mut rpl, Instant::from_secs(DIS_START_DELAY as i64));
        assert_eq!(transmits.len(), 1);
        assert_eq!(transmits[0].dst_addr, Ipv6Address::LINK_LOCAL_ALL_RPL_NODES);
        assert!(matches!(
            &transmits[0].msg,
            RplRepr::DodagInformationSolicitation(_)
        ));
    }

    #[test]
    fn malformed_payload_is_counted_and_dropped() {
        let mut rpl = root_node(ModeOfOperation::StoringModeWithoutMulticast);

        // A DIO truncated in the middle of its base object.
        rpl.process_icmp(
            Instant::ZERO,
            ll_addr(2),
            ll_addr(99),
            &[0x9b, 0x01, 0x00, 0x00, 0x1e, 0xf0],
        );

        assert_eq!(rpl.stats().malformed_msgs, 1);
        assert!(drain(&mut rpl, Instant::ZERO).is_empty());
    }

    #[test]
    fn parent_switch_withdraws_through_old_parent() {
        // Join through a parent two hops deep.
        let mut rpl = Rpl::new(Config::new(RplInstanceId::from(30)), Instant::ZERO);
        rpl.set_global_address(global_addr(1));

        let old_parent = ll_addr(1);
        rpl.process(
            Instant::ZERO,
            old_parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(512, ModeOfOperation::StoringModeWithoutMulticast),
        );
        drain(&mut rpl, Instant::ZERO);
        rpl.instance.dao_expiration = None;

        // Degrade the link to the current parent just enough that a direct
        // link to the root beats the hysteresis, while the old parent stays
        // acceptable.
        for _ in 0..2 {
            rpl.link_stats_packet_sent(
                Instant::ZERO,
                old_parent,
                TransmissionStatus::NoAck,
                1,
            );
        }

        let new_parent = ll_addr(2);
        rpl.process(
            Instant::ZERO,
            new_parent,
            Ipv6Address::LINK_LOCAL_ALL_RPL_NODES,
            &dio(256, ModeOfOperation::StoringModeWithoutMulticast),
        );

        let dodag = rpl.instance.dodag().unwrap();
        assert_eq!(dodag.preferred_parent().unwrap().address(), new_parent);

        // The old parent is told that we are gone.
        let transmits = drain(&mut rpl, Instant::ZERO);
        let withdrawal = transmits
            .iter()
            .find(|t| t.dst_addr == old_parent)
            .expect("expected a No-Path DAO through the old parent");

        match &withdrawal.msg {
            RplRepr::DestinationAdvertisementObject(dao) => {
                let lifetime = dao.options.iter().find_map(|opt| match opt {
                    OptionRepr::TransitInformation(t) => Some(t.path_lifetime),
                    _ => None,
                });
                assert_eq!(lifetime, Some(ZERO_LIFETIME));
            }
            msg => panic!("expected DAO, got {msg}"),
        }
    }

    #[test]
    fn transmit_emit_round_trip() {
        let mut rpl = root_node(ModeOfOperation::StoringModeWithoutMulticast);

        rpl.process(
            Instant::ZERO,
            ll_addr(2),
            ll_addr(99),
            &RplRepr::DodagInformationSolicitation(Dis {
                options: Default::default(),
            }),
        );

        let transmit = drain(&mut rpl, Instant::ZERO).remove(0);

        let mut buffer = std::vec![0u8; transmit.buffer_len()];
        let len = transmit.emit(&ll_addr(1), &mut buffer);
        assert_eq!(len, buffer.len());

        let packet = Icmpv6Packet::new_checked(&buffer[..]).unwrap();
        assert!(packet.verify_checksum(&ll_addr(1), &transmit.dst_addr));
        assert_eq!(RplRepr::parse(&packet).unwrap(), transmit.msg);
    }
}
