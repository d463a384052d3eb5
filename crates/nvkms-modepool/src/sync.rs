//! Selection of the HorizSync and VertRefresh windows a mode is checked against.

use nvkms_timing::{FrequencyRange, ParsedEdid};

use crate::dpy::Dpy;
use crate::params::{FrequencyRangeSource, FrequencyRanges, ValidSyncs, MAX_VALID_SYNC_RANGES};

/// HorizSync fallback, in Hz. Together with [`DEFAULT_VERT_REFRESH_HZ1K`] this admits
/// 1024x768 @ 60 Hz.
pub const DEFAULT_HORIZ_SYNC_HZ: FrequencyRange = FrequencyRange::new(28_000, 55_000);
pub const DEFAULT_VERT_REFRESH_HZ1K: FrequencyRange = FrequencyRange::new(43_000, 72_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncKind {
    Horizontal,
    Vertical,
}

fn client_ranges_are_valid(ranges: &FrequencyRanges) -> bool {
    ranges.ranges.len() < MAX_VALID_SYNC_RANGES
        && ranges
            .ranges
            .iter()
            .all(|range| range.high >= range.low && range.high != 0)
}

fn edid_range(edid: &ParsedEdid, kind: SyncKind) -> Option<FrequencyRange> {
    if !edid.valid {
        return None;
    }
    let (low, high) = match kind {
        SyncKind::Horizontal => (edid.limits.min_h_rate_hz, edid.limits.max_h_rate_hz),
        SyncKind::Vertical => (edid.limits.min_v_rate_hzx1k, edid.limits.max_v_rate_hzx1k),
    };
    (low != 0 && high != 0).then_some(FrequencyRange::new(low, high))
}

fn resolve(
    client: &FrequencyRanges,
    edid: &ParsedEdid,
    kind: SyncKind,
    ignore_edid_source: bool,
) -> FrequencyRanges {
    let mut ranges = client.clone();

    let from_client = matches!(
        ranges.source,
        FrequencyRangeSource::ClientBeforeEdid | FrequencyRangeSource::ClientAfterEdid
    );
    if from_client && !client_ranges_are_valid(&ranges) {
        tracing::debug!(?kind, source = ?ranges.source, "discarding invalid client sync ranges");
        ranges = FrequencyRanges::default();
    }

    if ranges.source == FrequencyRangeSource::ClientBeforeEdid {
        return ranges;
    }

    if !ignore_edid_source {
        if let Some(range) = edid_range(edid, kind) {
            return FrequencyRanges::new(FrequencyRangeSource::Edid, vec![range]);
        }
    }

    if ranges.source == FrequencyRangeSource::ClientAfterEdid {
        return ranges;
    }

    let fallback = match kind {
        SyncKind::Horizontal => DEFAULT_HORIZ_SYNC_HZ,
        SyncKind::Vertical => DEFAULT_VERT_REFRESH_HZ1K,
    };
    FrequencyRanges::new(FrequencyRangeSource::ConservativeDefaults, vec![fallback])
}

/// Picks the effective sync windows for `dpy`.
///
/// Priority is client ranges tagged `ClientBeforeEdid`, then the EDID range limits (unless
/// `ignore_edid_source`), then `ClientAfterEdid`, then conservative defaults. Malformed
/// client lists are dropped before the choice is made.
pub fn resolve_valid_syncs(dpy: &Dpy, client: &ValidSyncs) -> ValidSyncs {
    let edid = &dpy.parsed_edid;
    ValidSyncs {
        ignore_edid_source: client.ignore_edid_source,
        horiz_sync_hz: resolve(
            &client.horiz_sync_hz,
            edid,
            SyncKind::Horizontal,
            client.ignore_edid_source,
        ),
        vert_refresh_hz1k: resolve(
            &client.vert_refresh_hz1k,
            edid,
            SyncKind::Vertical,
            client.ignore_edid_source,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvkms_timing::EdidRangeLimits;
    use pretty_assertions::assert_eq;

    fn dpy_with_limits() -> Dpy {
        let mut dpy = Dpy::default();
        dpy.parsed_edid.valid = true;
        dpy.parsed_edid.limits = EdidRangeLimits {
            min_h_rate_hz: 30_000,
            max_h_rate_hz: 83_000,
            min_v_rate_hzx1k: 56_000,
            max_v_rate_hzx1k: 76_000,
            max_pclk_10khz: 17_000,
        };
        dpy
    }

    #[test]
    fn defaults_without_edid() {
        let syncs = resolve_valid_syncs(&Dpy::default(), &ValidSyncs::default());
        assert_eq!(
            syncs.horiz_sync_hz,
            FrequencyRanges::new(
                FrequencyRangeSource::ConservativeDefaults,
                vec![DEFAULT_HORIZ_SYNC_HZ]
            )
        );
        assert_eq!(syncs.vert_refresh_hz1k.ranges, vec![DEFAULT_VERT_REFRESH_HZ1K]);
    }

    #[test]
    fn edid_beats_client_after_edid() {
        let client = ValidSyncs {
            horiz_sync_hz: FrequencyRanges::new(
                FrequencyRangeSource::ClientAfterEdid,
                vec![FrequencyRange::new(10_000, 20_000)],
            ),
            ..ValidSyncs::default()
        };
        let syncs = resolve_valid_syncs(&dpy_with_limits(), &client);
        assert_eq!(syncs.horiz_sync_hz.source, FrequencyRangeSource::Edid);
        assert_eq!(syncs.horiz_sync_hz.ranges, vec![FrequencyRange::new(30_000, 83_000)]);

        let ignoring = ValidSyncs {
            ignore_edid_source: true,
            ..client
        };
        let syncs = resolve_valid_syncs(&dpy_with_limits(), &ignoring);
        assert_eq!(syncs.horiz_sync_hz.source, FrequencyRangeSource::ClientAfterEdid);
        assert_eq!(
            syncs.vert_refresh_hz1k.source,
            FrequencyRangeSource::ConservativeDefaults
        );
    }

    #[test]
    fn client_before_edid_wins() {
        let client = ValidSyncs {
            vert_refresh_hz1k: FrequencyRanges::new(
                FrequencyRangeSource::ClientBeforeEdid,
                vec![FrequencyRange::new(50_000, 61_000), FrequencyRange::new(119_000, 121_000)],
            ),
            ..ValidSyncs::default()
        };
        let syncs = resolve_valid_syncs(&dpy_with_limits(), &client);
        assert_eq!(syncs.vert_refresh_hz1k, client.vert_refresh_hz1k);
        assert_eq!(syncs.horiz_sync_hz.source, FrequencyRangeSource::Edid);
    }

    #[test]
    fn malformed_client_lists_are_dropped() {
        let inverted = FrequencyRanges::new(
            FrequencyRangeSource::ClientBeforeEdid,
            vec![FrequencyRange::new(60_000, 50_000)],
        );
        let too_many = FrequencyRanges::new(
            FrequencyRangeSource::ClientBeforeEdid,
            vec![FrequencyRange::new(1, 2); MAX_VALID_SYNC_RANGES],
        );
        let zero_high = FrequencyRanges::new(
            FrequencyRangeSource::ClientBeforeEdid,
            vec![FrequencyRange::new(0, 0)],
        );
        for bad in [inverted, too_many, zero_high] {
            let client = ValidSyncs {
                horiz_sync_hz: bad,
                ..ValidSyncs::default()
            };
            let syncs = resolve_valid_syncs(&dpy_with_limits(), &client);
            assert_eq!(syncs.horiz_sync_hz.source, FrequencyRangeSource::Edid);
        }
    }
}
