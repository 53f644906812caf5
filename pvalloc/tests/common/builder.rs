use pvalloc::{
    set_lv_segment_area_pv, LvSegment, LvSegmentId, PhysicalVolume, PvId, VolumeGroup,
};
use uguid::{guid, Guid};

#[allow(dead_code)]
pub const VG_ID: Guid = guid!("5e1c2f9a-0b8d-4c27-9f3e-6a7d8b9c0d1e");
#[allow(dead_code)]
pub const PV_ID: Guid = guid!("a3b4c5d6-e7f8-4a1b-8c2d-3e4f5a6b7c8d");

/// Declarative volume group layout for tests
#[allow(dead_code)]
pub struct VgBuilder {
    name: String,
    extent_size: u32,
    pvs: Vec<PhysicalVolume>,
    lvs: Vec<(String, String, u32, u32)>,
}

#[allow(dead_code)]
impl VgBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extent_size: 8,
            pvs: Vec::new(),
            lvs: Vec::new(),
        }
    }

    pub fn extent_size(mut self, extent_size: u32) -> Self {
        self.extent_size = extent_size;
        self
    }

    /// Add a PV of `pe_count` extents
    pub fn pv(mut self, dev_name: &str, pe_count: u32) -> Self {
        self.pvs
            .push(PhysicalVolume::new(dev_name, PV_ID, self.extent_size, pe_count));
        self
    }

    /// Add a prepared PV
    pub fn with_pv(mut self, pv: PhysicalVolume) -> Self {
        self.pvs.push(pv);
        self
    }

    /// Place a single-area LV segment of `len` extents at `pe` on `dev_name`
    pub fn lv(mut self, lv_name: &str, dev_name: &str, pe: u32, len: u32) -> Self {
        self.lvs
            .push((lv_name.to_string(), dev_name.to_string(), pe, len));
        self
    }

    pub fn build(self) -> VolumeGroup {
        self.build_with_ids().0
    }

    /// Build and return the handles of the placed LV segments, in order
    pub fn build_with_ids(self) -> (VolumeGroup, Vec<LvSegmentId>) {
        let mut vg = VolumeGroup::new(self.name, VG_ID, self.extent_size);
        for pv in self.pvs {
            vg.add_pv(pv);
        }

        let mut ids = Vec::new();
        let mut next_le: std::collections::HashMap<String, u32> = Default::default();
        for (lv_name, dev_name, pe, len) in self.lvs {
            let le = next_le.entry(lv_name.clone()).or_insert(0);
            let lvseg = vg.add_lv_segment(LvSegment::new(lv_name.as_str(), *le, len, 1));
            *le += len;

            let pv = pv_id(&vg, &dev_name);
            set_lv_segment_area_pv(&mut vg, lvseg, 0, Some(pv), pe).expect("layout fits");
            ids.push(lvseg);
        }

        (vg, ids)
    }
}

#[allow(dead_code)]
pub fn pv_id(vg: &VolumeGroup, dev_name: &str) -> PvId {
    vg.find_pv(dev_name).expect("PV in volume group")
}

/// `(pe, len, allocated)` for every segment of a PV
#[allow(dead_code)]
pub fn layout(vg: &VolumeGroup, dev_name: &str) -> Vec<(u32, u32, bool)> {
    vg.pv(pv_id(vg, dev_name))
        .expect("PV")
        .segments()
        .iter()
        .map(|seg| (seg.pe, seg.len, seg.is_allocated()))
        .collect()
}
