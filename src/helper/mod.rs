pub mod posture_helper;
