macro_rules! shaders {
    ([ $( $name:ident, )* ]) => {
        /// Compiled compute shaders; each module gets the common prelude
        /// (camera + frame uniforms and shared helpers) prepended.
        #[derive(Debug)]
        pub struct Shaders {
            $( pub $name: wgpu::ShaderModule, )*
        }

        impl Shaders {
            pub fn new(device: &wgpu::Device) -> Self {
                log::debug!("Initializing shaders");

                Self {
                    $(
                        $name: {
                            let source = concat!(
                                include_str!("../shaders/common.wgsl"),
                                "\n",
                                include_str!(concat!(
                                    "../shaders/",
                                    stringify!($name),
                                    ".wgsl",
                                )),
                            );

                            device.create_shader_module(
                                wgpu::ShaderModuleDescriptor {
                                    label: Some(concat!(
                                        "glimmer_",
                                        stringify!($name),
                                    )),
                                    source: wgpu::ShaderSource::Wgsl(
                                        source.into(),
                                    ),
                                },
                            )
                        },
                    )*
                }
            }
        }
    };
}

shaders!([
    trace,
    reproject,
    validate,
    temporal,
    spatial,
    upsample,
]);
