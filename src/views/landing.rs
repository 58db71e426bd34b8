use super::Tone;

pub struct LandingView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub pitch: &'static str,
    pub highlights: [(&'static str, Tone); 4],
    pub call_to_action: &'static str,
}

pub const LANDING: LandingView = LandingView {
    title: "Model Autopsy AI",
    tagline: "Automated Root Cause Analysis for ML Model Failures",
    pitch: "Stop wasting days debugging. Upload your data and get an AI-powered \
            diagnosis of why your model failed, which features drifted, and what to do next.",
    highlights: [
        ("Detect Data Drift", Tone::Red),
        ("AI-Powered Diagnosis", Tone::Purple),
        ("Instant Analysis", Tone::Yellow),
        ("Actionable Insights", Tone::Green),
    ],
    call_to_action: "Start Diagnosis",
};
