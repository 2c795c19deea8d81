use encore_core::{fade_in, fade_out, interpolate, loudness_source, medley_fade, mix_volumes, LoudnessSource};
use encore_domain_chart::MedleyWindow;
use encore_ports::storage::SettingsDto;
use encore_ports::types::PercentVolume;

fn settings(music: u16, vocals: u16) -> SettingsDto {
    SettingsDto {
        music_volume_percent: PercentVolume::new(music),
        vocals_volume_percent: PercentVolume::new(vocals),
        ..SettingsDto::default()
    }
}

#[test]
fn full_vocals_selects_split_tracks() {
    assert_eq!(
        loudness_source(PercentVolume::new(100), true),
        LoudnessSource::SplitTracks
    );
    assert_eq!(
        loudness_source(PercentVolume::new(99), true),
        LoudnessSource::OriginalMix
    );
    assert_eq!(
        loudness_source(PercentVolume::new(100), false),
        LoudnessSource::OriginalMix
    );
}

#[test]
fn only_one_source_is_audible() {
    let split = mix_volumes(&settings(80, 100), true, 1.0);
    assert_eq!(split.original_mix.get(), 0.0);
    assert!((split.instrumental.get() - 0.8).abs() < 1e-6);
    assert!((split.vocals.get() - 0.8).abs() < 1e-6);

    let mixed = mix_volumes(&settings(80, 40), true, 1.0);
    assert!((mixed.original_mix.get() - 0.8).abs() < 1e-6);
    assert_eq!(mixed.instrumental.get(), 0.0);
    assert_eq!(mixed.vocals.get(), 0.0);
}

#[test]
fn fade_scales_music() {
    let half = mix_volumes(&settings(100, 0), false, 0.5);
    assert!((half.original_mix.get() - 0.5).abs() < 1e-6);
}

#[test]
fn interpolation_is_clamped() {
    assert_eq!(interpolate(0.0, 1.0, -10.0, 100.0), 0.0);
    assert!((interpolate(0.0, 1.0, 25.0, 100.0) - 0.25).abs() < 1e-6);
    assert_eq!(interpolate(0.0, 1.0, 500.0, 100.0), 1.0);
    assert_eq!(interpolate(0.2, 0.8, 0.0, 0.0), 0.8);
    assert!((fade_in(500.0, 1000.0) - 0.5).abs() < 1e-6);
    assert!((fade_out(250.0, 1000.0) - 0.25).abs() < 1e-6);
}

#[test]
fn medley_fades_in_and_out() {
    let window = MedleyWindow {
        start_beat: 20,
        end_beat: 60,
        start_millis: 10_000.0,
        start_with_countdown_millis: 7_000.0,
        end_millis: 30_000.0,
    };

    assert_eq!(medley_fade(&window, 7_000.0, 1_000.0, 2_000.0), 0.0);
    assert!((medley_fade(&window, 7_500.0, 1_000.0, 2_000.0) - 0.5).abs() < 1e-6);
    assert_eq!(medley_fade(&window, 15_000.0, 1_000.0, 2_000.0), 1.0);
    assert!((medley_fade(&window, 29_000.0, 1_000.0, 2_000.0) - 0.5).abs() < 1e-6);
    assert_eq!(medley_fade(&window, 30_000.0, 1_000.0, 2_000.0), 0.0);
}
