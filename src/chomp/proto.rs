//! Generated `chomp.v1beta1` protobuf types, client and server.

tonic::include_proto!("chomp.v1beta1");

/// Encoded descriptor set of `chomp/v1beta1/chomp.proto`, used by reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("chomp_descriptor");
