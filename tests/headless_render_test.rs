#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn scenes_render_on_a_real_adapter() {
    use spatialize::{
        camera::FixedCamera,
        context::{Context, Frame},
        render::FrameTarget,
        scenes::{Scene, cube::ExampleCube, model::ModelScene},
    };

    use crate::common::test_utils::{TRIANGLE_OBJ, write_file};

    /// Offscreen frames for a headless context.
    struct Offscreen<'a> {
        ctx: &'a Context,
        presented: u32,
    }

    impl FrameTarget<Frame> for Offscreen<'_> {
        fn acquire(&mut self) -> anyhow::Result<Frame> {
            Ok(self.ctx.offscreen_frame(64, 64))
        }

        fn present(&mut self, _frame: Frame) {
            self.presented += 1;
        }
    }

    let ctx = futures::executor::block_on(Context::headless(wgpu::TextureFormat::Rgba8UnormSrgb))
        .expect("No wgpu adapter available");
    let mut target = Offscreen { ctx: &ctx, presented: 0 };

    let mut cube = ExampleCube::new(&ctx).unwrap();
    cube.draw(0.0, &FixedCamera::default(), &mut target, &ctx).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "triangle.obj", TRIANGLE_OBJ);
    let mut model = ModelScene::load(&path, &ctx).unwrap();
    assert!(model.has_program());
    let camera = FixedCamera::framing(&model.bounding_box().unwrap(), cgmath::Deg(45.0), None, 64, 64);
    model.draw(0.0, &camera, &mut target, &ctx).unwrap();

    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .unwrap();
    assert_eq!(target.presented, 2);
}
