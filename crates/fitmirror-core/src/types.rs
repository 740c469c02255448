use serde::{Deserialize, Serialize};

/// Axis-aligned face box in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Always within [0, 1].
    pub confidence: f32,
}

/// A named anatomical location with position and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// Skeleton joints, in the order they are stored in [`Skeleton::keypoints`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const JOINT_COUNT: usize = 17;

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "leftEye",
            Joint::RightEye => "rightEye",
            Joint::LeftEar => "leftEar",
            Joint::RightEar => "rightEar",
            Joint::LeftShoulder => "leftShoulder",
            Joint::RightShoulder => "rightShoulder",
            Joint::LeftElbow => "leftElbow",
            Joint::RightElbow => "rightElbow",
            Joint::LeftWrist => "leftWrist",
            Joint::RightWrist => "rightWrist",
            Joint::LeftHip => "leftHip",
            Joint::RightHip => "rightHip",
            Joint::LeftKnee => "leftKnee",
            Joint::RightKnee => "rightKnee",
            Joint::LeftAnkle => "leftAnkle",
            Joint::RightAnkle => "rightAnkle",
        }
    }
}

/// Fixed joint layout relative to the anchor: (joint, dx, dy, confidence factor).
///
/// Left joints sit at negative x offsets. Every joint's confidence is the
/// overall confidence times its factor.
const JOINT_LAYOUT: [(Joint, f32, f32, f32); JOINT_COUNT] = [
    (Joint::Nose, 0.0, 20.0, 0.9),
    (Joint::LeftEye, -15.0, 10.0, 0.8),
    (Joint::RightEye, 15.0, 10.0, 0.8),
    (Joint::LeftEar, -25.0, 15.0, 0.7),
    (Joint::RightEar, 25.0, 15.0, 0.7),
    (Joint::LeftShoulder, -60.0, 80.0, 0.9),
    (Joint::RightShoulder, 60.0, 80.0, 0.9),
    (Joint::LeftElbow, -80.0, 140.0, 0.8),
    (Joint::RightElbow, 80.0, 140.0, 0.8),
    (Joint::LeftWrist, -90.0, 200.0, 0.7),
    (Joint::RightWrist, 90.0, 200.0, 0.7),
    (Joint::LeftHip, -40.0, 240.0, 0.9),
    (Joint::RightHip, 40.0, 240.0, 0.9),
    (Joint::LeftKnee, -45.0, 340.0, 0.8),
    (Joint::RightKnee, 45.0, 340.0, 0.8),
    (Joint::LeftAnkle, -50.0, 440.0, 0.7),
    (Joint::RightAnkle, 50.0, 440.0, 0.7),
];

/// Full set of keypoints for one detection tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Indexed by [`Joint::index`].
    pub keypoints: [Keypoint; JOINT_COUNT],
    /// Overall confidence in [0, 1].
    pub confidence: f32,
}

impl Skeleton {
    /// Derive every joint from one anchor point and one confidence value.
    pub fn synthesize(center_x: f32, top_y: f32, confidence: f32) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        let mut keypoints = [Keypoint::default(); JOINT_COUNT];
        for (joint, dx, dy, factor) in JOINT_LAYOUT {
            keypoints[joint.index()] = Keypoint {
                x: center_x + dx,
                y: top_y + dy,
                confidence: (confidence * factor).clamp(0.0, 1.0),
            };
        }
        Self { keypoints, confidence }
    }

    pub fn keypoint(&self, joint: Joint) -> &Keypoint {
        &self.keypoints[joint.index()]
    }

    pub fn keypoint_mut(&mut self, joint: Joint) -> &mut Keypoint {
        &mut self.keypoints[joint.index()]
    }

    /// Iterate `(joint, keypoint)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &Keypoint)> {
        Joint::ALL.iter().map(move |&j| (j, &self.keypoints[j.index()]))
    }
}
