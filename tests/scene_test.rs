use cgmath::{Deg, Point3};
use spatialize::{
    camera::{Camera, FixedCamera},
    error::ShaderError,
    render::Transforms,
    scenes::{Scene, cube::{self, ExampleCube}, model::{self, ModelScene}},
};

use crate::common::test_utils::{
    RecordedElements, RecordingDevice, RecordingTarget, TRIANGLE_OBJ, write_file, write_png,
};

mod common;

#[test]
fn cube_clears_draws_three_vertices_and_presents() {
    let device = RecordingDevice::new();
    let mut target = RecordingTarget::default();
    let mut scene = ExampleCube::new(&device).unwrap();

    scene.draw(0.0, &FixedCamera::default(), &mut target, &device).unwrap();
    scene.draw(0.016, &FixedCamera::default(), &mut target, &device).unwrap();

    assert_eq!(target.presented, vec![1, 2]);
    let passes = device.passes.borrow();
    assert_eq!(passes.len(), 2);
    let pass = &passes[0];
    assert_eq!(pass.clear_colour, cube::CLEAR_COLOUR);
    assert_eq!(pass.clear_colour, [0.2, 0.3, 0.3, 1.0]);
    assert!(pass.program.is_some());
    assert_eq!(pass.transforms, Transforms::default());
    assert_eq!(pass.draws.len(), 1);
    assert_eq!(pass.draws[0].elements, RecordedElements::Arrays(3));

    let buffers = device.vertex_buffers.borrow();
    let positions: Vec<f32> = buffers[0]
        .1
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(positions, [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0]);
}

#[test]
fn cube_box_is_fixed() {
    let device = RecordingDevice::new();
    let scene = ExampleCube::new(&device).unwrap();
    let r = std::f32::consts::SQRT_2;

    let bounds = scene.bounding_box().unwrap();

    assert_eq!(bounds.min, Point3::new(-r, -r, -r));
    assert_eq!(bounds.max, Point3::new(r, r, r));
}

#[test]
fn cube_with_an_unlinkable_shader_fails() {
    let device = RecordingDevice::new();
    let only_vertex = "
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
";

    let result = ExampleCube::with_shader(&device, only_vertex);

    assert!(matches!(result, Err(ShaderError::Link { .. })));
}

#[test]
fn cube_with_a_broken_stage_fails_to_compile() {
    let device = RecordingDevice::new();

    let result = ExampleCube::with_shader(&device, "@vertex fn vs_main( {");

    assert!(matches!(result, Err(ShaderError::Compile { .. })));
    assert!(device.programs.borrow().is_empty());
    assert!(device.vertex_buffers.borrow().is_empty());
}

#[test]
fn lost_surface_is_reported_and_nothing_is_submitted() {
    let device = RecordingDevice::new();
    let mut target = RecordingTarget {
        lost: true,
        ..Default::default()
    };
    let mut scene = ExampleCube::new(&device).unwrap();

    assert!(scene.draw(0.0, &FixedCamera::default(), &mut target, &device).is_err());
    assert!(device.passes.borrow().is_empty());
    assert!(target.presented.is_empty());
}

#[test]
fn model_scene_draws_every_mesh_with_camera_transforms() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "crate.png", 2, 2);
    write_file(dir.path(), "crate.mtl", "newmtl wood\nmap_Kd crate.png\n");
    let obj = write_file(
        dir.path(),
        "crate.obj",
        format!(
            "mtllib crate.mtl\n{}o Second\nv 2 2 2\nv 3 2 2\nv 2 3 2\nf 4 5 6\n",
            TRIANGLE_OBJ.replacen("o Triangle\n", "o Triangle\nusemtl wood\n", 1)
        ),
    );
    let device = RecordingDevice::new();
    let mut target = RecordingTarget::default();

    let mut scene = ModelScene::load(&obj, &device).unwrap();
    assert!(scene.has_program());
    let bounds = scene.bounding_box().unwrap();
    assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(bounds.max, Point3::new(3.0, 3.0, 2.0));

    let camera = FixedCamera::framing(&bounds, Deg(45.0), None, 800, 600);
    scene.draw(1.5, &camera, &mut target, &device).unwrap();

    let passes = device.passes.borrow();
    let pass = &passes[0];
    assert_eq!(pass.clear_colour, model::CLEAR_COLOUR);
    assert_eq!(pass.transforms.view, camera.view());
    assert_eq!(pass.transforms.projection, camera.projection());
    assert_eq!(pass.transforms.model, camera.object_to_world());
    assert_eq!(pass.draws.len(), 2);
    for (draw, mesh) in pass.draws.iter().zip(&scene.model.meshes) {
        assert_eq!(draw.vertices, mesh.vertex_buffer);
        assert_eq!(
            draw.elements,
            RecordedElements::Indexed {
                buffer: mesh.index_buffer,
                count: 3
            }
        );
    }
    let diffuse = scene.model.meshes[0].textures[0].handle;
    assert_eq!(pass.draws[0].diffuse, Some(diffuse));
    assert_eq!(pass.draws[0].specular, None);
    assert_eq!(target.presented, vec![1]);
}

#[test]
fn model_scene_rejects_unknown_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "scene.fbx", "");
    assert!(ModelScene::load(&path, &RecordingDevice::new()).is_err());
}

#[test]
fn model_scene_of_an_empty_file_clears_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "empty.obj", "# nothing here\n");
    let device = RecordingDevice::new();
    let mut target = RecordingTarget::default();

    let mut scene = ModelScene::load(&path, &device).unwrap();
    assert!(scene.bounding_box().is_none());

    scene.draw(0.0, &FixedCamera::default(), &mut target, &device).unwrap();

    assert!(device.passes.borrow()[0].draws.is_empty());
    assert_eq!(target.presented, vec![1]);
}
